//! Cleaned sales records and read helpers shared by filter and aggregation.

use super::dates;
use super::schema::{ORDER_DATE, SALES};
use super::DataError;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

/// Earliest and latest Order Date of a dataset, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateBounds {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A cleaned table of sales records.
///
/// Every row has a valid `Order Date` (polars `Date`), text dimensions and
/// numeric measures. Filtering produces new datasets; a dataset is never
/// narrowed in place.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    df: DataFrame,
}

impl SalesDataset {
    /// Wrap a frame that already went through [`crate::data::DataCleaner`].
    pub(crate) fn from_clean_frame(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Order Dates as days since the Unix epoch, one per row.
    pub fn order_days(&self) -> Result<Vec<Option<i32>>, DataError> {
        let days = self.df.column(ORDER_DATE)?.cast(&DataType::Int32)?;
        Ok(days.i32()?.into_iter().collect())
    }

    /// Order Dates as calendar dates, one per row.
    pub fn order_dates(&self) -> Result<Vec<Option<NaiveDate>>, DataError> {
        Ok(self
            .order_days()?
            .into_iter()
            .map(|days| days.and_then(dates::from_epoch_days))
            .collect())
    }

    /// Min and max Order Date, `None` for an empty dataset.
    pub fn date_bounds(&self) -> Result<Option<DateBounds>, DataError> {
        let days = self.order_days()?;
        let mut present = days.into_iter().flatten();
        let Some(first) = present.next() else {
            return Ok(None);
        };
        let (min, max) = present.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));

        Ok(dates::from_epoch_days(min)
            .zip(dates::from_epoch_days(max))
            .map(|(start, end)| DateBounds { start, end }))
    }

    /// Text values of a column, one per row.
    pub fn text_values(&self, column: &str) -> Result<Vec<Option<String>>, DataError> {
        let values = self.df.column(column)?.cast(&DataType::String)?;
        Ok(values
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }

    /// Distinct non-null values of a column in first-seen order.
    pub fn unique_values(&self, column: &str) -> Result<Vec<String>, DataError> {
        let mut seen = HashSet::new();
        Ok(self
            .text_values(column)?
            .into_iter()
            .flatten()
            .filter(|v| seen.insert(v.clone()))
            .collect())
    }

    /// Numeric values of a column as f64, one per row.
    pub fn float_values(&self, column: &str) -> Result<Vec<Option<f64>>, DataError> {
        let values = self.df.column(column)?.cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().collect())
    }

    /// Integer values of a column as i64, one per row.
    pub fn int_values(&self, column: &str) -> Result<Vec<Option<i64>>, DataError> {
        let values = self.df.column(column)?.cast(&DataType::Int64)?;
        Ok(values.i64()?.into_iter().collect())
    }

    /// Sum of Sales over all rows, nulls ignored.
    pub fn total_sales(&self) -> Result<f64, DataError> {
        Ok(self.float_values(SALES)?.into_iter().flatten().sum())
    }

    /// Rows kept by `mask`, as a new dataset.
    pub fn retain(&self, mask: &BooleanChunked) -> Result<Self, DataError> {
        Ok(Self {
            df: self.df.filter(mask)?,
        })
    }
}
