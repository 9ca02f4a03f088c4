//! Sales Dashboard - exploratory analysis of retail sales records
//!
//! Loads a sales table (CSV or workbook), cleans it, applies a date range and
//! a Region -> State -> City filter cascade, aggregates Sales and produces
//! SVG charts, CSV extracts and a JSON render model.

pub mod aggregate;
pub mod charts;
pub mod dashboard;
pub mod data;
pub mod export;
pub mod settings;

pub use dashboard::{Dashboard, DashboardModel, DashboardOutcome, DashboardWarning};
pub use settings::DashboardSettings;
