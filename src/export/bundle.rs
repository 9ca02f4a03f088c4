//! Report Bundle Module
//! Packs extracts, rendered charts and the render model into one ZIP archive.

use super::ExportError;
use log::info;
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One file inside the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// Path inside the archive, `/` separated.
    pub path: String,
    pub bytes: Vec<u8>,
}

impl BundleEntry {
    pub fn new(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }
}

/// Writes report bundles.
pub struct ReportBundler;

impl ReportBundler {
    /// Write the bundle to `output_path`.
    pub fn write_bundle(entries: &[BundleEntry], output_path: &Path) -> Result<(), ExportError> {
        let file = File::create(output_path)?;
        Self::write_entries(file, entries)?;
        info!(
            "Report bundle written: {} ({} files)",
            output_path.display(),
            entries.len()
        );
        Ok(())
    }

    /// Build the bundle in memory.
    pub fn bundle_to_bytes(entries: &[BundleEntry]) -> Result<Vec<u8>, ExportError> {
        let cursor = Self::write_entries(Cursor::new(Vec::new()), entries)?;
        Ok(cursor.into_inner())
    }

    fn write_entries<W: Write + Seek>(writer: W, entries: &[BundleEntry]) -> Result<W, ExportError> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in entries {
            zip.start_file(entry.path.as_str(), options)?;
            zip.write_all(&entry.bytes)?;
        }

        Ok(zip.finish()?)
    }
}
