use chrono::NaiveDate;
use polars::prelude::*;
use sales_dashboard::data::{
    DataCleaner, DataError, DataLoader, FilterSelection, FilterStage, SalesFilter, Upload,
};
use sales_dashboard::export::{CsvExporter, ReportBundler};
use sales_dashboard::{Dashboard, DashboardOutcome, DashboardSettings};
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

const HEADER: &str =
    "Row ID,Order Date,Region,State,City,Category,Sub-Category,Segment,Sales,Profit,Quantity";

const ROWS: [&str; 10] = [
    "1,01/03/2017,East,New York,New York City,Furniture,Chairs,Consumer,100,10,2",
    "2,01/15/2017,West,California,Los Angeles,Technology,Phones,Corporate,200,20,3",
    "3,01/25/2017,East,New York,Buffalo,Office Supplies,Paper,Consumer,30,3,1",
    "4,02/05/2017,East,Pennsylvania,Philadelphia,Furniture,Tables,Home Office,400,-40,5",
    "5,02/14/2017,West,Washington,Seattle,Furniture,Chairs,Consumer,150,15,2",
    "6,02/28/2017,East,New York,New York City,Technology,Phones,Corporate,250,25,1",
    "7,03/01/2017,East,New York,New York City,Furniture,Chairs,Consumer,500,50,4",
    "8,03/10/2017,West,California,San Francisco,Office Supplies,Paper,Consumer,60,6,2",
    "9,03/20/2017,East,Pennsylvania,Philadelphia,Technology,Phones,Home Office,70,7,1",
    "10,03/31/2017,West,Washington,Seattle,Technology,Phones,Corporate,80,8,3",
];

fn csv_text() -> String {
    let mut text = String::from(HEADER);
    for row in ROWS {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}

fn write_default_file(dir: &Path) -> DataLoader {
    let path = dir.join("Superstore.csv");
    fs::write(&path, csv_text()).unwrap();
    DataLoader::new(path)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn east_until_february() -> FilterSelection {
    FilterSelection {
        start: Some(date(2017, 1, 1)),
        end: Some(date(2017, 2, 28)),
        regions: vec!["East".into()],
        ..Default::default()
    }
}

fn ready(outcome: DashboardOutcome) -> Box<Dashboard> {
    match outcome {
        DashboardOutcome::Ready(dashboard) => dashboard,
        DashboardOutcome::NoData { warning, .. } => panic!("unexpected empty result: {warning}"),
    }
}

#[test]
fn east_region_until_end_of_february() {
    let dir = tempfile::tempdir().unwrap();
    let loader = write_default_file(dir.path());

    let outcome = Dashboard::run(&loader, None, &east_until_february(), &DashboardSettings::default())
        .unwrap();
    let dashboard = ready(outcome);
    let model = &dashboard.model;

    // Rows 1, 3, 4 and 6; the end date is inclusive
    assert_eq!(model.total_rows, 10);
    assert_eq!(model.row_count, 4);
    assert_eq!(model.category_sales.keys(), ["Furniture", "Office Supplies", "Technology"]);
    assert_eq!(model.category_sales.get("Furniture"), Some(500.0));
    assert_eq!(model.category_sales.get("Office Supplies"), Some(30.0));
    assert_eq!(model.category_sales.get("Technology"), Some(250.0));
    assert_eq!(model.region_sales.keys(), ["East"]);
    assert!((model.category_sales.total() - model.total_sales).abs() < 1e-9);

    assert_eq!(model.time_series.keys(), ["2017-Jan", "2017-Feb"]);
    assert_eq!(model.time_series.values(), [130.0, 650.0]);

    assert_eq!(model.options.regions, ["East", "West"]);
    assert_eq!(model.options.states, ["New York", "Pennsylvania"]);
    assert_eq!(model.options.cities, ["New York City", "Buffalo", "Philadelphia"]);
}

#[test]
fn cascade_stages_narrow_in_order() {
    let raw = DataLoader::parse_delimited(csv_text().as_bytes()).unwrap();
    let dataset = DataCleaner::clean(raw).unwrap();

    let selection = FilterSelection {
        regions: vec!["West".into()],
        states: vec!["Washington".into()],
        ..Default::default()
    };
    let cascade = SalesFilter::cascade(&dataset, &selection).unwrap();

    assert_eq!(cascade.date_filtered.height(), 10);
    assert_eq!(cascade.region_filtered.height(), 4);
    assert_eq!(cascade.state_filtered.height(), 2);
    assert_eq!(cascade.filtered.height(), 2);
    assert_eq!(cascade.options.states, ["California", "Washington"]);
    assert_eq!(cascade.options.cities, ["Seattle"]);
    for region in cascade.filtered.text_values("Region").unwrap() {
        assert_eq!(region.as_deref(), Some("West"));
    }
}

#[test]
fn date_range_outside_data_gives_warning() {
    let dir = tempfile::tempdir().unwrap();
    let loader = write_default_file(dir.path());
    let selection = FilterSelection {
        start: Some(date(2019, 1, 1)),
        end: Some(date(2019, 6, 30)),
        ..Default::default()
    };

    let outcome = Dashboard::run(&loader, None, &selection, &DashboardSettings::default()).unwrap();
    match outcome {
        DashboardOutcome::NoData { warning, bounds, .. } => {
            assert_eq!(warning.stage, FilterStage::DateRange);
            assert_eq!(
                warning.to_string(),
                "No data available for the selected date range. Please adjust your filters."
            );
            assert_eq!((bounds.start, bounds.end), (date(2017, 1, 3), date(2017, 3, 31)));
        }
        DashboardOutcome::Ready(_) => panic!("expected an empty result"),
    }
}

#[test]
fn missing_order_date_column_is_a_schema_error() {
    let text = csv_text().replace("Order Date", "Ship Date");
    let upload = Upload::new("orders.csv", text.into_bytes());
    let loader = DataLoader::new("/nonexistent/Superstore.csv");

    let err = Dashboard::run(
        &loader,
        Some(&upload),
        &FilterSelection::default(),
        &DashboardSettings::default(),
    )
    .err()
    .unwrap();

    assert!(matches!(err, DataError::Schema(_)));
    assert_eq!(err.missing_columns(), ["Order Date"]);
}

#[test]
fn no_upload_and_no_default_file() {
    let dir = tempfile::tempdir().unwrap();
    let loader = DataLoader::new(dir.path().join("Superstore.csv"));

    let err = Dashboard::run(&loader, None, &FilterSelection::default(), &DashboardSettings::default())
        .err()
        .unwrap();
    assert!(matches!(err, DataError::MissingInput(_)));
}

#[test]
fn upload_takes_precedence_over_default_file() {
    let dir = tempfile::tempdir().unwrap();
    let loader = write_default_file(dir.path());

    let mut text = String::from(HEADER);
    text.push('\n');
    text.push_str(ROWS[0]);
    let upload = Upload::new("one_row.csv", text.into_bytes());

    let outcome = Dashboard::run(
        &loader,
        Some(&upload),
        &FilterSelection::default(),
        &DashboardSettings::default(),
    )
    .unwrap();
    assert_eq!(ready(outcome).model.total_rows, 1);
}

#[test]
fn latin1_upload_is_decoded() {
    let mut bytes = format!("{HEADER}\n").into_bytes();
    bytes.extend_from_slice(b"1,04/02/2017,East,Quebec,Montr\xe9al,Furniture,Chairs,Consumer,12.5,1,1\n");
    let upload = Upload::new("superstore.csv", bytes);

    let outcome = Dashboard::run(
        &DataLoader::new("/nonexistent/Superstore.csv"),
        Some(&upload),
        &FilterSelection::default(),
        &DashboardSettings::default(),
    )
    .unwrap();
    let dashboard = ready(outcome);
    assert_eq!(dashboard.model.options.cities, ["Montréal"]);
}

#[test]
fn workbook_upload_loads() {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in HEADER.split(',').enumerate() {
        sheet.write_string(0, col as u16, name).unwrap();
    }
    for (row, line) in ROWS.iter().enumerate() {
        for (col, value) in line.split(',').enumerate() {
            let (r, c) = (row as u32 + 1, col as u16);
            match value.parse::<f64>() {
                Ok(number) if col >= 8 => sheet.write_number(r, c, number).unwrap(),
                _ => sheet.write_string(r, c, value).unwrap(),
            };
        }
    }
    let bytes = workbook.save_to_buffer().unwrap();

    let upload = Upload::new("Superstore.xlsx", bytes);
    let outcome = Dashboard::run(
        &DataLoader::new("/nonexistent/Superstore.csv"),
        Some(&upload),
        &east_until_february(),
        &DashboardSettings::default(),
    )
    .unwrap();
    let dashboard = ready(outcome);
    let model = &dashboard.model;

    assert_eq!(model.total_rows, 10);
    assert_eq!(model.row_count, 4);
    assert_eq!(model.category_sales.get("Furniture"), Some(500.0));
}

#[test]
fn data_extract_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let loader = write_default_file(dir.path());
    let outcome = Dashboard::run(&loader, None, &east_until_february(), &DashboardSettings::default())
        .unwrap();
    let dashboard = ready(outcome);

    let extract = CsvExporter::data_extract(&dashboard.filtered).unwrap();
    assert_eq!(extract.file_name, "Data.csv");

    let text = String::from_utf8(extract.bytes.clone()).unwrap();
    assert!(text.lines().nth(1).unwrap().contains("2017-01-03"), "{text}");

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(extract.bytes))
        .finish()
        .unwrap();
    assert_eq!(df.height(), 4);

    // Whole-number sales are written without a fraction and read back as integers
    let sales = df.column("Sales").unwrap().cast(&DataType::Float64).unwrap();
    let total: f64 = sales.f64().unwrap().into_iter().flatten().sum();
    assert!((total - 780.0).abs() < 1e-9);
}

#[test]
fn sub_category_month_extract_leaves_gaps_empty() {
    let dir = tempfile::tempdir().unwrap();
    let loader = write_default_file(dir.path());
    let outcome = Dashboard::run(&loader, None, &east_until_february(), &DashboardSettings::default())
        .unwrap();
    let dashboard = ready(outcome);

    let extracts = dashboard.extracts().unwrap();
    let extract = extracts
        .iter()
        .find(|e| e.file_name == "SubCategory_Month_Sales.csv")
        .unwrap();
    let text = String::from_utf8(extract.bytes.clone()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    // East until February: Chairs and Paper sell in January, Phones and Tables in February
    assert_eq!(lines[0], "Sub-Category,January,February");
    let fields = |key: &str| -> Vec<String> {
        lines
            .iter()
            .find(|line| line.starts_with(key))
            .unwrap()
            .split(',')
            .map(str::to_string)
            .collect()
    };
    let chairs = fields("Chairs");
    assert_eq!(chairs[1].parse::<f64>().unwrap(), 100.0);
    assert_eq!(chairs[2], "", "{text}");
    let tables = fields("Tables");
    assert_eq!(tables[1], "", "{text}");
    assert_eq!(tables[2].parse::<f64>().unwrap(), 400.0);
    let phones = fields("Phones");
    assert_eq!(phones[1], "", "{text}");
    assert_eq!(phones[2].parse::<f64>().unwrap(), 250.0);
}

#[test]
fn bundle_contains_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let loader = write_default_file(dir.path());
    let outcome = Dashboard::run(&loader, None, &FilterSelection::default(), &DashboardSettings::default())
        .unwrap();
    let dashboard = ready(outcome);

    let entries = dashboard.bundle_entries((800, 500)).unwrap();
    let path = dir.path().join("report.zip");
    ReportBundler::write_bundle(&entries, &path).unwrap();

    let mut archive = ::zip::ZipArchive::new(fs::File::open(&path).unwrap()).unwrap();
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    for expected in [
        "data/Category_Sales.csv",
        "data/Region_Sales.csv",
        "data/TimeSeries_Sales.csv",
        "data/SubCategory_Month_Sales.csv",
        "data/Data.csv",
        "charts/category_sales.svg",
        "charts/treemap.svg",
        "dashboard.json",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {expected} in {names:?}");
    }

    let mut json = String::new();
    archive.by_name("dashboard.json").unwrap().read_to_string(&mut json).unwrap();
    let model: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(model["row_count"], 10);
}
