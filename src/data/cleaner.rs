//! Data Cleaner Module
//! Schema validation, Order Date coercion and measure typing.

use super::dates;
use super::schema::{
    CATEGORICAL_COLUMNS, MEASURE_COLUMNS, ORDER_DATE, QUANTITY, REQUIRED_COLUMNS,
};
use super::{DataError, SalesDataset};
use log::{debug, info, warn};
use polars::prelude::*;
use std::collections::HashSet;

/// Validates and normalizes a freshly loaded frame.
pub struct DataCleaner;

impl DataCleaner {
    /// Validate the schema, coerce dates and drop rows without a valid date.
    ///
    /// Rows whose Order Date cannot be parsed are removed entirely rather than
    /// imputed.
    pub fn clean(df: DataFrame) -> Result<SalesDataset, DataError> {
        Self::validate_schema(&df)?;

        let loaded = df.height();
        let df = Self::coerce_order_dates(df)?;
        let dropped = loaded - df.height();
        if dropped > 0 {
            warn!("Dropped {} of {} rows with an invalid Order Date", dropped, loaded);
        }

        if df.height() == 0 {
            return Err(DataError::EmptyDataset("no row has a valid Order Date"));
        }

        let df = Self::coerce_types(df)?;
        info!("Cleaned dataset: {} rows", df.height());
        Ok(SalesDataset::from_clean_frame(df))
    }

    /// Order Date is checked on its own first so that its absence is always
    /// reported; the remaining required columns are checked together.
    pub fn validate_schema(df: &DataFrame) -> Result<(), DataError> {
        let present: HashSet<&str> = df
            .get_column_names()
            .iter()
            .map(|name| name.as_str())
            .collect();

        if !present.contains(ORDER_DATE) {
            return Err(DataError::Schema(vec![ORDER_DATE.to_string()]));
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| !present.contains(**name))
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DataError::Schema(missing))
        }
    }

    /// Replace Order Date with a polars `Date` column, dropping unparsable rows.
    fn coerce_order_dates(df: DataFrame) -> Result<DataFrame, DataError> {
        let raw = df.column(ORDER_DATE)?.cast(&DataType::String)?;
        let parsed: Vec<Option<i32>> = raw
            .str()?
            .into_iter()
            .map(|value| value.and_then(dates::parse_date).map(dates::to_epoch_days))
            .collect();

        let mask: BooleanChunked = parsed.iter().map(Option::is_some).collect();
        let mut df = df.filter(&mask)?;

        let days: Vec<i32> = parsed.into_iter().flatten().collect();
        let order_dates = Column::new(ORDER_DATE.into(), days).cast(&DataType::Date)?;
        df.with_column(order_dates)?;
        Ok(df)
    }

    /// Dimensions become text, Sales/Profit f64 and Quantity i64.
    /// Unconvertible values turn into nulls.
    fn coerce_types(df: DataFrame) -> Result<DataFrame, DataError> {
        let mut casts: Vec<Expr> = CATEGORICAL_COLUMNS
            .iter()
            .map(|name| col(*name).cast(DataType::String))
            .collect();
        casts.extend(
            MEASURE_COLUMNS
                .iter()
                .map(|name| col(*name).cast(DataType::Float64)),
        );
        casts.push(col(QUANTITY).cast(DataType::Int64));

        let df = df.lazy().with_columns(casts).collect()?;
        debug!("Column types: {:?}", df.dtypes());
        Ok(df)
    }
}
