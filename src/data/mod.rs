//! Data module - loading, cleaning and filtering

mod cleaner;
mod dataset;
pub mod dates;
mod error;
mod filter;
mod loader;
pub mod schema;

pub use cleaner::DataCleaner;
pub use dataset::{DateBounds, SalesDataset};
pub use error::DataError;
pub use filter::{
    EmptyResultWarning, FilterCascade, FilterOptions, FilterSelection, FilterStage, SalesFilter,
};
pub use loader::{default_data_path, decode_legacy, DataLoader, InputFormat, Upload, DEFAULT_DATA_FILE};
