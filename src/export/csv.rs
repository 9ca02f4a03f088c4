//! CSV Export Module
//! Downloadable extracts: UTF-8, comma separated, header row, no index column.

use super::ExportError;
use crate::aggregate::{AggregateTable, PivotTable};
use crate::data::SalesDataset;
use log::debug;
use polars::prelude::*;
use serde::Serialize;

pub const CATEGORY_EXTRACT: &str = "Category_Sales.csv";
pub const REGION_EXTRACT: &str = "Region_Sales.csv";
pub const TIME_SERIES_EXTRACT: &str = "TimeSeries_Sales.csv";
pub const SUB_CATEGORY_MONTH_EXTRACT: &str = "SubCategory_Month_Sales.csv";
pub const DATA_EXTRACT: &str = "Data.csv";

/// A named CSV payload ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvExtract {
    pub file_name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl CsvExtract {
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            bytes,
        }
    }
}

/// Serializes frames and tables to CSV bytes.
pub struct CsvExporter;

impl CsvExporter {
    /// Plain decimal notation, no thousands separators; dates as `YYYY-MM-DD`.
    pub fn to_csv(df: &DataFrame) -> Result<Vec<u8>, ExportError> {
        let mut df = df.clone();
        let mut buf = Vec::new();
        CsvWriter::new(&mut buf)
            .include_header(true)
            .with_separator(b',')
            .with_float_scientific(Some(false))
            .finish(&mut df)?;
        debug!("Serialized {} rows to {} CSV bytes", df.height(), buf.len());
        Ok(buf)
    }

    pub fn table_to_csv(table: &AggregateTable) -> Result<Vec<u8>, ExportError> {
        Self::to_csv(&table.to_frame()?)
    }

    /// Empty cells stay empty; they are not written as zero.
    pub fn pivot_to_csv(pivot: &PivotTable) -> Result<Vec<u8>, ExportError> {
        Self::to_csv(&pivot.to_frame()?)
    }

    pub fn category_extract(table: &AggregateTable) -> Result<CsvExtract, ExportError> {
        Ok(CsvExtract::new(CATEGORY_EXTRACT, Self::table_to_csv(table)?))
    }

    pub fn region_extract(table: &AggregateTable) -> Result<CsvExtract, ExportError> {
        Ok(CsvExtract::new(REGION_EXTRACT, Self::table_to_csv(table)?))
    }

    pub fn time_series_extract(table: &AggregateTable) -> Result<CsvExtract, ExportError> {
        Ok(CsvExtract::new(TIME_SERIES_EXTRACT, Self::table_to_csv(table)?))
    }

    pub fn sub_category_month_extract(pivot: &PivotTable) -> Result<CsvExtract, ExportError> {
        Ok(CsvExtract::new(SUB_CATEGORY_MONTH_EXTRACT, Self::pivot_to_csv(pivot)?))
    }

    /// The full cleaned and filtered dataset.
    pub fn data_extract(ds: &SalesDataset) -> Result<CsvExtract, ExportError> {
        Ok(CsvExtract::new(DATA_EXTRACT, Self::to_csv(ds.frame())?))
    }
}
