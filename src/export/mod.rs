//! Export module - CSV extracts and report bundles

mod bundle;
mod csv;

pub use bundle::{BundleEntry, ReportBundler};
pub use csv::{
    CsvExporter, CsvExtract, CATEGORY_EXTRACT, DATA_EXTRACT, REGION_EXTRACT,
    SUB_CATEGORY_MONTH_EXTRACT, TIME_SERIES_EXTRACT,
};

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Chart error: {0}")]
    Chart(#[from] crate::charts::ChartError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
