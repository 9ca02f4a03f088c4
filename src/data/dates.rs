//! Best-effort Order Date parsing and calendar helpers.
//!
//! Dates are stored in the frame as polars `Date` values, i.e. days since the
//! Unix epoch, so most of the pipeline moves `i32` day numbers around and only
//! converts back to `NaiveDate` at the edges.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Excel's day zero for the 1900 date system (serial 1 is 1900-01-01, with the
/// historical leap-year bug absorbed by starting on the 30th).
const EXCEL_EPOCH_DAYS_FROM_CE: i32 = 693_594;

// Two-digit year formats go first: `%Y` would happily read "16" as year 16.
const DATE_FORMATS: [&str; 15] = [
    "%m/%d/%y",
    "%m-%d-%y",
    "%d-%b-%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d-%b-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%Y%m%d",
];

const DATETIME_FORMATS: [&str; 9] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M %p",
];

/// Parse a date cell, trying the common spreadsheet and ISO layouts.
///
/// Returns `None` for anything that does not look like a calendar date; the
/// cleaner drops those rows.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            if date.year() >= 1000 {
                return Some(date);
            }
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// Convert a date to polars' physical `Date` representation.
pub fn to_epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Inverse of [`to_epoch_days`].
pub fn from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

/// Convert an Excel serial date (1900 system) to a calendar date.
pub fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.floor() as i32;
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(EXCEL_EPOCH_DAYS_FROM_CE)?)
}

/// Time series label, e.g. `2016-Nov`.
pub fn month_year_label(year: i32, month: u32) -> String {
    format!("{:04}-{}", year, MONTH_ABBREVIATIONS[month_index(month)])
}

/// Full English month name, e.g. `November`.
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[month_index(month)]
}

fn month_index(month: u32) -> usize {
    (month.clamp(1, 12) - 1) as usize
}

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
