//! Range & Categorical Filter Module
//! Inclusive date range followed by the Region -> State -> City cascade.

use super::dates;
use super::schema::{CITY, REGION, STATE};
use super::{DataError, DateBounds, SalesDataset};
use chrono::NaiveDate;
use log::debug;
use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// User-chosen constraints for one invocation.
///
/// Missing dates default to the dataset bounds. An empty value set means
/// "no filter" for that stage, never "no rows".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub regions: Vec<String>,
    pub states: Vec<String>,
    pub cities: Vec<String>,
}

impl FilterSelection {
    /// Resolve the date interval against the dataset bounds.
    pub fn date_range(&self, bounds: DateBounds) -> (NaiveDate, NaiveDate) {
        (
            self.start.unwrap_or(bounds.start),
            self.end.unwrap_or(bounds.end),
        )
    }

    /// Same selection with both dates filled in.
    pub fn resolved(&self, bounds: DateBounds) -> Self {
        let (start, end) = self.date_range(bounds);
        Self {
            start: Some(start),
            end: Some(end),
            ..self.clone()
        }
    }
}

/// Options offered at each cascade stage, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub states: Vec<String>,
    pub cities: Vec<String>,
}

/// Every intermediate stage of one filter pass.
#[derive(Debug, Clone)]
pub struct FilterCascade {
    pub date_filtered: SalesDataset,
    pub region_filtered: SalesDataset,
    pub state_filtered: SalesDataset,
    pub filtered: SalesDataset,
    pub options: FilterOptions,
}

impl FilterCascade {
    /// The first stage that produced zero rows, if any.
    pub fn empty_stage(&self) -> Option<FilterStage> {
        if self.date_filtered.is_empty() {
            Some(FilterStage::DateRange)
        } else if self.filtered.is_empty() {
            Some(FilterStage::Categories)
        } else {
            None
        }
    }
}

/// Filter stage that can leave nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterStage {
    DateRange,
    Categories,
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStage::DateRange => write!(f, "the selected date range"),
            FilterStage::Categories => write!(f, "the selected filters"),
        }
    }
}

/// Zero rows after filtering. Not fatal: the user can change the selection.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[error("No data available for {stage}. Please adjust your filters.")]
pub struct EmptyResultWarning {
    pub stage: FilterStage,
}

/// Pure narrowing functions over [`SalesDataset`].
pub struct SalesFilter;

impl SalesFilter {
    /// Apply the date range and the categorical cascade.
    pub fn apply(ds: &SalesDataset, sel: &FilterSelection) -> Result<SalesDataset, DataError> {
        Ok(Self::cascade(ds, sel)?.filtered)
    }

    /// Run every stage, keeping the intermediate datasets and option lists.
    pub fn cascade(ds: &SalesDataset, sel: &FilterSelection) -> Result<FilterCascade, DataError> {
        let date_filtered = match ds.date_bounds()? {
            Some(bounds) => {
                let (start, end) = sel.date_range(bounds);
                Self::by_date_range(ds, start, end)?
            }
            None => ds.clone(),
        };

        let regions = date_filtered.unique_values(REGION)?;
        let region_filtered = Self::by_values(&date_filtered, REGION, &sel.regions)?;

        let states = region_filtered.unique_values(STATE)?;
        let state_filtered = Self::by_values(&region_filtered, STATE, &sel.states)?;

        let cities = state_filtered.unique_values(CITY)?;
        let filtered = Self::by_values(&state_filtered, CITY, &sel.cities)?;

        debug!(
            "Filter cascade: {} -> {} (date) -> {} (region) -> {} (state) -> {} (city)",
            ds.height(),
            date_filtered.height(),
            region_filtered.height(),
            state_filtered.height(),
            filtered.height()
        );

        Ok(FilterCascade {
            date_filtered,
            region_filtered,
            state_filtered,
            filtered,
            options: FilterOptions {
                regions,
                states,
                cities,
            },
        })
    }

    /// Keep rows with `start <= Order Date <= end`.
    pub fn by_date_range(
        ds: &SalesDataset,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SalesDataset, DataError> {
        let (start, end) = (dates::to_epoch_days(start), dates::to_epoch_days(end));
        let mask: BooleanChunked = ds
            .order_days()?
            .into_iter()
            .map(|day| day.is_some_and(|d| start <= d && d <= end))
            .collect();
        ds.retain(&mask)
    }

    /// Keep rows whose `column` value is in `allowed`; an empty `allowed`
    /// keeps everything.
    pub fn by_values(
        ds: &SalesDataset,
        column: &str,
        allowed: &[String],
    ) -> Result<SalesDataset, DataError> {
        if allowed.is_empty() {
            return Ok(ds.clone());
        }

        let allowed = Series::new(column.into(), allowed);
        let df = ds
            .frame()
            .clone()
            .lazy()
            .filter(col(column).is_in(lit(allowed)))
            .collect()?;
        debug!("{} filter kept {} of {} rows", column, df.height(), ds.height());
        Ok(SalesDataset::from_clean_frame(df))
    }
}
