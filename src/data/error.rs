//! Fatal pipeline errors.

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that halt the current invocation before anything is rendered.
#[derive(Error, Debug)]
pub enum DataError {
    #[error(
        "No file uploaded, and the default dataset is missing at {}. Please upload a file to proceed.",
        .0.display()
    )]
    MissingInput(PathBuf),
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse the input as a table: {0}")]
    Parse(String),
    #[error("The dataset is missing required column(s): {}", .0.join(", "))]
    Schema(Vec<String>),
    #[error("The dataset is empty or invalid: {0}")]
    EmptyDataset(&'static str),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl DataError {
    /// Missing columns when this is a schema error.
    pub fn missing_columns(&self) -> &[String] {
        match self {
            DataError::Schema(columns) => columns,
            _ => &[],
        }
    }
}
