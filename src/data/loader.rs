//! Sales Data Loader Module
//! Turns an upload (or the bundled default file) into a raw polars DataFrame.

use super::dates;
use super::DataError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use encoding_rs::Encoding;
use log::{debug, info};
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// File name of the bundled dataset.
pub const DEFAULT_DATA_FILE: &str = "Superstore.csv";

/// Rows scanned by polars to infer column types.
const INFER_SCHEMA_ROWS: usize = 10_000;

/// Exports from spreadsheet tools are frequently Latin-1, not UTF-8.
const LEGACY_ENCODING_LABEL: &[u8] = b"iso-8859-1";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// A user-supplied file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an upload from disk.
    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        let bytes = std::fs::read(path).map_err(|source| DataError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }

    /// Workbooks are recognised by extension or by their container signature.
    pub fn format(&self) -> InputFormat {
        let extension = Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

        match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => InputFormat::Workbook,
            _ if self.bytes.starts_with(ZIP_MAGIC) || self.bytes.starts_with(OLE_MAGIC) => {
                InputFormat::Workbook
            }
            _ => InputFormat::Delimited,
        }
    }
}

/// How the upload bytes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma separated text in a single-byte legacy encoding.
    Delimited,
    /// Spreadsheet workbook; the first worksheet is read.
    Workbook,
}

/// Loads the raw sales table from an upload or the default dataset.
#[derive(Debug, Clone)]
pub struct DataLoader {
    default_path: PathBuf,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(default_data_path())
    }
}

impl DataLoader {
    pub fn new(default_path: impl Into<PathBuf>) -> Self {
        Self {
            default_path: default_path.into(),
        }
    }

    /// Load the upload if present, otherwise fall back to the default file.
    pub fn load(&self, upload: Option<&Upload>) -> Result<DataFrame, DataError> {
        let df = match upload {
            Some(upload) => {
                info!("Loading upload {} ({} bytes)", upload.file_name, upload.bytes.len());
                Self::parse_upload(upload)?
            }
            None => {
                if !self.default_path.is_file() {
                    return Err(DataError::MissingInput(self.default_path.clone()));
                }
                info!("No upload, loading default dataset {}", self.default_path.display());
                let upload = Upload::from_path(&self.default_path)?;
                Self::parse_upload(&upload)?
            }
        };

        if df.height() == 0 {
            return Err(DataError::EmptyDataset("no rows were loaded"));
        }

        debug!("Loaded {} rows, {} columns", df.height(), df.width());
        Ok(df)
    }

    /// Parse upload bytes according to their format.
    pub fn parse_upload(upload: &Upload) -> Result<DataFrame, DataError> {
        match upload.format() {
            InputFormat::Delimited => Self::parse_delimited(&upload.bytes),
            InputFormat::Workbook => Self::parse_workbook(&upload.bytes),
        }
    }

    /// Decode legacy single-byte text and read it as CSV with a header row.
    pub fn parse_delimited(bytes: &[u8]) -> Result<DataFrame, DataError> {
        let text = decode_legacy(bytes);
        if text.trim().is_empty() {
            return Err(DataError::Parse("no columns to parse".to_string()));
        }

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
            .finish()
            .map_err(|e| DataError::Parse(e.to_string()))
    }

    /// Read the first worksheet; the first row holds the headers and every
    /// cell is kept as text so the cleaner applies one coercion path.
    pub fn parse_workbook(bytes: &[u8]) -> Result<DataFrame, DataError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| DataError::Parse(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| DataError::Parse("workbook contains no sheets".to_string()))?
            .map_err(|e| DataError::Parse(e.to_string()))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .ok_or_else(|| DataError::Parse("worksheet is empty".to_string()))?
            .iter()
            .map(|cell| cell_text(cell).unwrap_or_default())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(DataError::Parse("worksheet has no header row".to_string()));
        }

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        for row in rows {
            if row.iter().all(|cell| matches!(cell, Data::Empty)) {
                continue;
            }
            for (idx, values) in cells.iter_mut().enumerate() {
                values.push(row.get(idx).and_then(cell_text));
            }
        }

        let columns: Vec<Column> = headers
            .iter()
            .zip(cells)
            .map(|(name, values)| Column::new(name.as_str().into(), values))
            .collect();

        DataFrame::new(columns).map_err(|e| DataError::Parse(e.to_string()))
    }
}

/// `Superstore.csv` next to the executable, or in the working directory.
pub fn default_data_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_DATA_FILE)))
        .filter(|path| path.is_file())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}

/// Decode bytes with the legacy single-byte encoding. Every byte maps to a
/// character, so decoding never fails.
pub fn decode_legacy(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(bytes);
    let encoding = Encoding::for_label(LEGACY_ENCODING_LABEL).unwrap_or(encoding_rs::WINDOWS_1252);
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => {
            dates::from_excel_serial(dt.as_f64()).map(|date| date.format("%Y-%m-%d").to_string())
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}
