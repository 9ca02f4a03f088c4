//! Dashboard Pipeline
//! Load, clean, filter and aggregate in one pass and hand the result to the
//! presenter as a serializable render model.

use crate::aggregate::{
    AggregateTable, Aggregator, PivotTable, ScatterPoint, TablePreview, TreemapNode,
};
use crate::charts::{ChartError, StaticChartRenderer};
use crate::data::schema::SUMMARY_COLUMNS;
use crate::data::{
    DataCleaner, DataError, DataLoader, DateBounds, EmptyResultWarning, FilterOptions,
    FilterSelection, SalesDataset, SalesFilter, Upload,
};
use crate::export::{BundleEntry, CsvExporter, CsvExtract, ExportError};
use crate::settings::DashboardSettings;
use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

pub const MODEL_FILE: &str = "dashboard.json";

/// A table that came out empty. The rest of the dashboard is still shown.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("No data available for {table}.")]
pub struct DashboardWarning {
    pub table: String,
}

impl DashboardWarning {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
        }
    }
}

/// Everything the presenter needs for one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardModel {
    /// Order Date range of the whole dataset.
    pub bounds: DateBounds,
    /// Selection with both dates resolved.
    pub selection: FilterSelection,
    pub options: FilterOptions,
    pub total_rows: usize,
    pub row_count: usize,
    pub total_sales: f64,
    pub category_sales: AggregateTable,
    pub region_sales: AggregateTable,
    pub segment_sales: AggregateTable,
    pub time_series: AggregateTable,
    pub pivot: PivotTable,
    pub hierarchy: Vec<TreemapNode>,
    pub scatter: Vec<ScatterPoint>,
    pub summary: TablePreview,
    pub data_view: TablePreview,
    pub warnings: Vec<DashboardWarning>,
}

/// A rendered chart ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFile {
    pub file_name: &'static str,
    pub svg: String,
}

pub enum DashboardOutcome {
    Ready(Box<Dashboard>),
    /// A filter stage left nothing; aggregation and rendering were skipped.
    NoData {
        warning: EmptyResultWarning,
        bounds: DateBounds,
        options: FilterOptions,
    },
}

impl DashboardOutcome {
    pub fn dashboard(&self) -> Option<&Dashboard> {
        match self {
            DashboardOutcome::Ready(dashboard) => Some(dashboard.as_ref()),
            DashboardOutcome::NoData { .. } => None,
        }
    }
}

pub struct Dashboard {
    pub model: DashboardModel,
    /// Fully filtered dataset behind the model.
    pub filtered: SalesDataset,
}

impl Dashboard {
    /// Load, clean and build. `upload` wins over the loader's default file.
    pub fn run(
        loader: &DataLoader,
        upload: Option<&Upload>,
        selection: &FilterSelection,
        settings: &DashboardSettings,
    ) -> Result<DashboardOutcome, DataError> {
        let raw = loader.load(upload)?;
        let dataset = DataCleaner::clean(raw)?;
        Self::build(&dataset, selection, settings)
    }

    /// Filter a cleaned dataset and compute every view.
    pub fn build(
        dataset: &SalesDataset,
        selection: &FilterSelection,
        settings: &DashboardSettings,
    ) -> Result<DashboardOutcome, DataError> {
        let bounds = dataset
            .date_bounds()?
            .ok_or(DataError::EmptyDataset("no row has a valid Order Date"))?;
        let cascade = SalesFilter::cascade(dataset, selection)?;

        if let Some(stage) = cascade.empty_stage() {
            let warning = EmptyResultWarning { stage };
            warn!("{}", warning);
            return Ok(DashboardOutcome::NoData {
                warning,
                bounds,
                options: cascade.options,
            });
        }

        let filtered = cascade.filtered;
        let category_sales = Aggregator::by_category(&filtered)?;
        let region_sales = Aggregator::by_region(&filtered)?;
        let segment_sales = Aggregator::by_segment(&filtered)?;
        let time_series = Aggregator::time_series(&filtered)?;
        let pivot = Aggregator::pivot_sub_category_by_month(&filtered)?;
        let hierarchy = Aggregator::hierarchy(&filtered)?;
        let scatter = Aggregator::scatter(&filtered)?;

        let summary_frame = cascade.date_filtered.frame().select(SUMMARY_COLUMNS)?;
        let summary = TablePreview::from_frame(&summary_frame, settings.summary_rows)?;
        let data_view = TablePreview::from_frame(filtered.frame(), settings.data_view_rows)?;

        let mut warnings = Vec::new();
        for (name, empty) in [
            ("category sales", category_sales.is_empty()),
            ("region sales", region_sales.is_empty()),
            ("segment sales", segment_sales.is_empty()),
            ("the time series", time_series.is_empty()),
            ("the sub-category summary", pivot.is_empty()),
        ] {
            if empty {
                let warning = DashboardWarning::new(name);
                warn!("{}", warning);
                warnings.push(warning);
            }
        }

        let model = DashboardModel {
            bounds,
            selection: selection.resolved(bounds),
            options: cascade.options,
            total_rows: dataset.height(),
            row_count: filtered.height(),
            total_sales: filtered.total_sales()?,
            category_sales,
            region_sales,
            segment_sales,
            time_series,
            pivot,
            hierarchy,
            scatter,
            summary,
            data_view,
            warnings,
        };

        info!(
            "Dashboard built: {} of {} rows, total sales {:.2}",
            model.row_count, model.total_rows, model.total_sales
        );
        Ok(DashboardOutcome::Ready(Box::new(Self { model, filtered })))
    }

    /// Downloadable extracts. Empty tables are skipped; the filtered data is
    /// always included.
    pub fn extracts(&self) -> Result<Vec<CsvExtract>, ExportError> {
        let m = &self.model;
        let mut extracts = Vec::with_capacity(5);
        if !m.category_sales.is_empty() {
            extracts.push(CsvExporter::category_extract(&m.category_sales)?);
        }
        if !m.region_sales.is_empty() {
            extracts.push(CsvExporter::region_extract(&m.region_sales)?);
        }
        if !m.time_series.is_empty() {
            extracts.push(CsvExporter::time_series_extract(&m.time_series)?);
        }
        if !m.pivot.is_empty() {
            extracts.push(CsvExporter::sub_category_month_extract(&m.pivot)?);
        }
        extracts.push(CsvExporter::data_extract(&self.filtered)?);
        Ok(extracts)
    }

    /// Every chart that has data; empty ones are skipped.
    pub fn charts(&self, size: (u32, u32)) -> Result<Vec<ChartFile>, ChartError> {
        let m = &self.model;
        let rendered = [
            (
                "category_sales.svg",
                StaticChartRenderer::bar_chart(&m.category_sales, "Category-wise Sales", size),
            ),
            (
                "region_sales.svg",
                StaticChartRenderer::pie_chart(&m.region_sales, "Region-wise Sales", 0.5, size),
            ),
            (
                "time_series.svg",
                StaticChartRenderer::line_chart(&m.time_series, "Time Series Analysis", size),
            ),
            (
                "treemap.svg",
                StaticChartRenderer::treemap(&m.hierarchy, "Hierarchical View of Sales", size),
            ),
            (
                "segment_sales.svg",
                StaticChartRenderer::pie_chart(&m.segment_sales, "Segment wise Sales", 0.0, size),
            ),
            (
                "category_share.svg",
                StaticChartRenderer::pie_chart(&m.category_sales, "Category wise Sales", 0.0, size),
            ),
            (
                "sales_vs_profit.svg",
                StaticChartRenderer::scatter(&m.scatter, "Relationship between Sales and Profits", size),
            ),
        ];

        let mut charts = Vec::with_capacity(rendered.len());
        for (file_name, result) in rendered {
            match result {
                Ok(svg) => charts.push(ChartFile { file_name, svg }),
                Err(ChartError::NoData(title)) => debug!("Skipping chart '{}': no data", title),
                Err(err) => return Err(err),
            }
        }
        Ok(charts)
    }

    pub fn model_json(&self) -> Result<Vec<u8>, ExportError> {
        Ok(serde_json::to_vec_pretty(&self.model)?)
    }

    /// Archive layout: `data/` extracts, `charts/` SVGs and the model at the root.
    pub fn bundle_entries(&self, size: (u32, u32)) -> Result<Vec<BundleEntry>, ExportError> {
        let mut entries = Vec::new();
        for extract in self.extracts()? {
            entries.push(BundleEntry::new(format!("data/{}", extract.file_name), extract.bytes));
        }
        for chart in self.charts(size)? {
            entries.push(BundleEntry::new(format!("charts/{}", chart.file_name), chart.svg.into_bytes()));
        }
        entries.push(BundleEntry::new(MODEL_FILE, self.model_json()?));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FilterStage;
    use chrono::NaiveDate;
    use polars::prelude::*;

    fn dataset() -> SalesDataset {
        let df = df!(
            "Order Date" => ["01/05/2017", "01/20/2017", "02/10/2017", "03/02/2017"],
            "Region" => ["East", "West", "East", "East"],
            "State" => ["New York", "California", "New York", "Ohio"],
            "City" => ["New York City", "Los Angeles", "Buffalo", "Columbus"],
            "Category" => ["Furniture", "Technology", "Furniture", "Office Supplies"],
            "Sub-Category" => ["Chairs", "Phones", "Tables", "Paper"],
            "Segment" => ["Consumer", "Corporate", "Consumer", "Home Office"],
            "Sales" => [100.0, 250.0, 50.5, 20.0],
            "Profit" => [10.0, -20.0, 5.0, 2.0],
            "Quantity" => [2i64, 3, 1, 4]
        )
        .unwrap();
        DataCleaner::clean(df).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn builds_model_for_selection() {
        let selection = FilterSelection {
            regions: vec!["East".into()],
            ..Default::default()
        };
        let outcome = Dashboard::build(&dataset(), &selection, &DashboardSettings::default()).unwrap();
        let dashboard = outcome.dashboard().unwrap();
        let model = &dashboard.model;

        assert_eq!(model.total_rows, 4);
        assert_eq!(model.row_count, 3);
        assert_eq!(model.category_sales.get("Furniture"), Some(150.5));
        assert_eq!(model.category_sales.get("Technology"), None);
        assert_eq!(model.selection.start, Some(date(2017, 1, 5)));
        assert_eq!(model.selection.end, Some(date(2017, 3, 2)));
        assert_eq!(model.options.regions, ["East", "West"]);
        assert_eq!(model.options.states, ["New York", "Ohio"]);
        assert!((model.total_sales - 170.5).abs() < 1e-9);
        assert!(model.warnings.is_empty());
    }

    #[test]
    fn summary_uses_date_filtered_rows() {
        let selection = FilterSelection {
            cities: vec!["Buffalo".into()],
            ..Default::default()
        };
        let settings = DashboardSettings::default();
        let outcome = Dashboard::build(&dataset(), &selection, &settings).unwrap();
        let model = &outcome.dashboard().unwrap().model;

        assert_eq!(model.row_count, 1);
        assert_eq!(model.summary.len(), 4);
        assert_eq!(model.summary.columns, SUMMARY_COLUMNS);
        assert_eq!(model.data_view.len(), 1);
        // The data view keeps every column, not the every-other-column slice
        assert_eq!(model.data_view.columns.len(), 10);
        assert_eq!(model.data_view.columns[0], "Order Date");
        assert_eq!(model.data_view.columns[1], "Region");
    }

    #[test]
    fn empty_date_range_is_not_fatal() {
        let selection = FilterSelection {
            start: Some(date(2020, 1, 1)),
            end: Some(date(2020, 12, 31)),
            ..Default::default()
        };
        let outcome = Dashboard::build(&dataset(), &selection, &DashboardSettings::default()).unwrap();
        match outcome {
            DashboardOutcome::NoData { warning, bounds, .. } => {
                assert_eq!(warning.stage, FilterStage::DateRange);
                assert_eq!(bounds.start, date(2017, 1, 5));
            }
            DashboardOutcome::Ready(_) => panic!("expected no data"),
        }
    }

    #[test]
    fn unknown_city_yields_category_warning() {
        let selection = FilterSelection {
            cities: vec!["Atlantis".into()],
            ..Default::default()
        };
        let outcome = Dashboard::build(&dataset(), &selection, &DashboardSettings::default()).unwrap();
        assert!(matches!(
            outcome,
            DashboardOutcome::NoData {
                warning: EmptyResultWarning {
                    stage: FilterStage::Categories
                },
                ..
            }
        ));
    }

    #[test]
    fn renders_every_chart_and_extract() {
        let outcome =
            Dashboard::build(&dataset(), &FilterSelection::default(), &DashboardSettings::default()).unwrap();
        let dashboard = outcome.dashboard().unwrap();

        let charts = dashboard.charts((800, 500)).unwrap();
        assert_eq!(charts.len(), 7);
        assert!(charts.iter().all(|c| c.svg.contains("<svg")));

        let names: Vec<String> = dashboard.extracts().unwrap().into_iter().map(|e| e.file_name).collect();
        assert_eq!(
            names,
            [
                "Category_Sales.csv",
                "Region_Sales.csv",
                "TimeSeries_Sales.csv",
                "SubCategory_Month_Sales.csv",
                "Data.csv"
            ]
        );

        let json: serde_json::Value = serde_json::from_slice(&dashboard.model_json().unwrap()).unwrap();
        assert_eq!(json["row_count"], 4);
        assert_eq!(json["bounds"]["start"], "2017-01-05");
    }
}
