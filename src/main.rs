//! Sales Dashboard - retail sales EDA from the command line
//!
//! Each invocation loads the data, applies the selected filters and writes
//! the charts, CSV extracts and render model to an output directory.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use log::{info, LevelFilter};
use sales_dashboard::charts::format_currency;
use sales_dashboard::dashboard::MODEL_FILE;
use sales_dashboard::data::{dates, DataLoader, FilterSelection, Upload};
use sales_dashboard::export::ReportBundler;
use sales_dashboard::{Dashboard, DashboardOutcome, DashboardSettings};
use std::fs;
use std::path::PathBuf;

const BUNDLE_FILE: &str = "dashboard_report.zip";

#[derive(Parser, Debug)]
#[command(name = "sales-dashboard", version, about = "Sample Superstore EDA dashboard")]
struct Cli {
    /// Sales table to analyse (.csv, .txt, .xlsx, .xls). Defaults to Superstore.csv.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Dataset used when --input is not given
    #[arg(long)]
    default_data: Option<PathBuf>,

    /// First Order Date to include (inclusive)
    #[arg(long, value_parser = parse_date_arg)]
    start: Option<NaiveDate>,

    /// Last Order Date to include (inclusive)
    #[arg(long, value_parser = parse_date_arg)]
    end: Option<NaiveDate>,

    /// Region to keep; repeat for several
    #[arg(long = "region")]
    regions: Vec<String>,

    /// State to keep; repeat for several
    #[arg(long = "state")]
    states: Vec<String>,

    /// City to keep; repeat for several
    #[arg(long = "city")]
    cities: Vec<String>,

    /// Output directory
    #[arg(short, long, default_value = "dashboard")]
    out: PathBuf,

    /// Also pack every artifact into one ZIP archive
    #[arg(long)]
    bundle: bool,

    /// Open the output directory when done
    #[arg(long)]
    open: bool,

    /// Chart width in pixels
    #[arg(long, default_value_t = 900)]
    width: u32,

    /// Chart height in pixels
    #[arg(long, default_value_t = 500)]
    height: u32,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn settings(&self) -> DashboardSettings {
        let defaults = DashboardSettings::default();
        DashboardSettings {
            default_data: self.default_data.clone().unwrap_or(defaults.default_data),
            output_dir: self.out.clone(),
            bundle: self.bundle,
            open_output: self.open,
            ..defaults
        }
        .with_chart_size(self.width, self.height)
    }

    fn selection(&self) -> FilterSelection {
        FilterSelection {
            start: self.start,
            end: self.end,
            regions: self.regions.clone(),
            states: self.states.clone(),
            cities: self.cities.clone(),
        }
    }

    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn parse_date_arg(raw: &str) -> std::result::Result<NaiveDate, String> {
    dates::parse_date(raw).ok_or_else(|| format!("unrecognised date '{raw}'"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .format_timestamp(None)
        .init();

    let settings = cli.settings();
    let loader = DataLoader::new(&settings.default_data);
    let upload = cli
        .input
        .as_deref()
        .map(Upload::from_path)
        .transpose()
        .context("Failed to read input file")?;

    let outcome = Dashboard::run(&loader, upload.as_ref(), &cli.selection(), &settings)
        .context("Failed to build dashboard")?;

    match outcome {
        DashboardOutcome::NoData {
            warning,
            bounds,
            options,
        } => {
            println!("{warning}");
            println!("Data covers {} to {}", bounds.start, bounds.end);
            println!("Regions: {}", options.regions.join(", "));
            if !options.states.is_empty() {
                println!("States: {}", options.states.join(", "));
            }
        }
        DashboardOutcome::Ready(dashboard) => {
            write_outputs(&dashboard, &settings)?;
            print_summary(&dashboard, &settings);
        }
    }

    Ok(())
}

fn write_outputs(dashboard: &Dashboard, settings: &DashboardSettings) -> Result<()> {
    let out = &settings.output_dir;
    let charts_dir = out.join("charts");
    fs::create_dir_all(&charts_dir)
        .with_context(|| format!("Failed to create {}", charts_dir.display()))?;

    for extract in dashboard.extracts().context("Failed to export CSV")? {
        let path = out.join(&extract.file_name);
        fs::write(&path, &extract.bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    for chart in dashboard.charts(settings.chart_size).context("Failed to render charts")? {
        let path = charts_dir.join(chart.file_name);
        fs::write(&path, chart.svg).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let model_path = out.join(MODEL_FILE);
    fs::write(&model_path, dashboard.model_json()?)
        .with_context(|| format!("Failed to write {}", model_path.display()))?;

    if settings.bundle {
        let entries = dashboard.bundle_entries(settings.chart_size)?;
        ReportBundler::write_bundle(&entries, &out.join(BUNDLE_FILE)).context("Failed to write report bundle")?;
    }

    info!("Dashboard written to {}", out.display());

    if settings.open_output {
        open::that(out).with_context(|| format!("Failed to open {}", out.display()))?;
    }
    Ok(())
}

fn print_summary(dashboard: &Dashboard, settings: &DashboardSettings) {
    let model = &dashboard.model;
    println!(
        "{} to {}: {} of {} rows, total sales {}",
        model.selection.start.unwrap_or(model.bounds.start),
        model.selection.end.unwrap_or(model.bounds.end),
        model.row_count,
        model.total_rows,
        format_currency(model.total_sales)
    );
    for row in &model.category_sales.rows {
        println!("  {:<20} {:>16}", row.key, format_currency(row.sales));
    }
    for warning in &model.warnings {
        println!("{warning}");
    }
    println!("Output: {}", settings.output_dir.display());
}
