//! Charts module - SVG chart rendering

mod plotter;
mod renderer;
mod treemap;

pub use plotter::{format_axis_value, format_currency, pie_slices, PieSlice, PALETTE};
pub use renderer::StaticChartRenderer;
pub use treemap::{squarify, LayoutRect};

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Drawing error: {0}")]
    Drawing(String),
    #[error("No data to plot for '{0}'")]
    NoData(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ChartError::Drawing(err.to_string())
    }
}
