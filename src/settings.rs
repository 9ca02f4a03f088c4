//! Dashboard Settings
//! In-memory configuration for one invocation. Nothing is persisted.

use crate::data::default_data_path;
use std::path::PathBuf;

/// Rows shown in the summary preview.
pub const SUMMARY_ROWS: usize = 5;
/// Rows shown in the filtered data view.
pub const DATA_VIEW_ROWS: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    /// Dataset used when no upload is given.
    pub default_data: PathBuf,
    pub output_dir: PathBuf,
    /// Chart width and height in pixels.
    pub chart_size: (u32, u32),
    pub summary_rows: usize,
    pub data_view_rows: usize,
    /// Also write everything into a single ZIP archive.
    pub bundle: bool,
    /// Open the output directory when done.
    pub open_output: bool,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            default_data: default_data_path(),
            output_dir: PathBuf::from("dashboard"),
            chart_size: (900, 500),
            summary_rows: SUMMARY_ROWS,
            data_view_rows: DATA_VIEW_ROWS,
            bundle: false,
            open_output: false,
        }
    }
}

impl DashboardSettings {
    /// Width and height clamped to something plotters can lay out.
    pub fn with_chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = (width.max(200), height.max(150));
        self
    }
}
