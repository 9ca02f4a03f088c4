//! Sales Aggregator Module
//! Groupby sums, time series, pivot and hierarchy over a filtered dataset.

use super::{AggregateRow, AggregateTable, PivotRow, PivotTable, ScatterPoint, TreemapNode};
use crate::data::dates;
use crate::data::schema::{
    CATEGORY, MONTH_YEAR, PROFIT, QUANTITY, REGION, SALES, SEGMENT, SUB_CATEGORY,
};
use crate::data::{DataError, SalesDataset};
use chrono::Datelike;
use log::debug;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Computes the aggregated views of the dashboard. All sums are over Sales
/// and keep full f64 precision.
pub struct Aggregator;

impl Aggregator {
    pub fn by_category(ds: &SalesDataset) -> Result<AggregateTable, DataError> {
        Self::sum_by(ds, CATEGORY)
    }

    pub fn by_region(ds: &SalesDataset) -> Result<AggregateTable, DataError> {
        Self::sum_by(ds, REGION)
    }

    pub fn by_segment(ds: &SalesDataset) -> Result<AggregateTable, DataError> {
        Self::sum_by(ds, SEGMENT)
    }

    pub fn by_sub_category(ds: &SalesDataset) -> Result<AggregateTable, DataError> {
        Self::sum_by(ds, SUB_CATEGORY)
    }

    /// Sales summed per distinct value of `key`, sorted by key.
    /// Rows with a null key belong to no group.
    pub fn sum_by(ds: &SalesDataset, key: &str) -> Result<AggregateTable, DataError> {
        let grouped = ds
            .frame()
            .clone()
            .lazy()
            .group_by([col(key)])
            .agg([col(SALES).sum()])
            .collect()?;

        let keys = grouped.column(key)?.str()?;
        let sums = grouped.column(SALES)?.f64()?;

        let mut rows: Vec<AggregateRow> = keys
            .into_iter()
            .zip(sums.into_iter())
            .filter_map(|(key, sales)| {
                Some(AggregateRow {
                    key: key?.to_string(),
                    sales: sales.unwrap_or(0.0),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));

        debug!("Aggregated Sales by {}: {} groups", key, rows.len());
        Ok(AggregateTable::new(key, SALES, rows))
    }

    /// Sales per calendar month, labelled `yyyy-Mon` and sorted
    /// chronologically regardless of input order.
    pub fn time_series(ds: &SalesDataset) -> Result<AggregateTable, DataError> {
        let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for (date, sales) in ds.order_dates()?.into_iter().zip(ds.float_values(SALES)?) {
            if let Some(date) = date {
                *months.entry((date.year(), date.month())).or_insert(0.0) += sales.unwrap_or(0.0);
            }
        }

        let rows = months
            .into_iter()
            .map(|((year, month), sales)| AggregateRow {
                key: dates::month_year_label(year, month),
                sales,
            })
            .collect();

        Ok(AggregateTable::new(MONTH_YEAR, SALES, rows))
    }

    /// Sub-Category rows (sorted) by month-name columns (calendar order).
    /// Combinations without transactions stay `None`, distinct from zero sales.
    pub fn pivot_sub_category_by_month(ds: &SalesDataset) -> Result<PivotTable, DataError> {
        let sub_categories = ds.text_values(SUB_CATEGORY)?;
        let order_dates = ds.order_dates()?;
        let sales = ds.float_values(SALES)?;

        let mut cells: BTreeMap<String, BTreeMap<u32, f64>> = BTreeMap::new();
        let mut months: BTreeSet<u32> = BTreeSet::new();

        for ((sub_category, date), sale) in sub_categories.into_iter().zip(order_dates).zip(sales) {
            let (Some(sub_category), Some(date)) = (sub_category, date) else {
                continue;
            };
            months.insert(date.month());
            *cells
                .entry(sub_category)
                .or_default()
                .entry(date.month())
                .or_insert(0.0) += sale.unwrap_or(0.0);
        }

        let rows = cells
            .into_iter()
            .map(|(key, by_month)| PivotRow {
                key,
                cells: months.iter().map(|m| by_month.get(m).copied()).collect(),
            })
            .collect();

        Ok(PivotTable {
            row_column: SUB_CATEGORY.to_string(),
            columns: months
                .iter()
                .map(|m| dates::month_name(*m).to_string())
                .collect(),
            rows,
        })
    }

    /// Region -> Category -> Sub-Category tree of summed Sales.
    pub fn hierarchy(ds: &SalesDataset) -> Result<Vec<TreemapNode>, DataError> {
        let grouped = ds
            .frame()
            .clone()
            .lazy()
            .group_by([col(REGION), col(CATEGORY), col(SUB_CATEGORY)])
            .agg([col(SALES).sum()])
            .collect()?;

        let regions = grouped.column(REGION)?.str()?;
        let categories = grouped.column(CATEGORY)?.str()?;
        let sub_categories = grouped.column(SUB_CATEGORY)?.str()?;
        let sums = grouped.column(SALES)?.f64()?;

        let mut tree: BTreeMap<&str, BTreeMap<&str, BTreeMap<&str, f64>>> = BTreeMap::new();
        for (((region, category), sub_category), sales) in regions
            .into_iter()
            .zip(categories.into_iter())
            .zip(sub_categories.into_iter())
            .zip(sums.into_iter())
        {
            let (Some(region), Some(category), Some(sub_category)) = (region, category, sub_category)
            else {
                continue;
            };
            tree.entry(region)
                .or_default()
                .entry(category)
                .or_default()
                .insert(sub_category, sales.unwrap_or(0.0));
        }

        Ok(tree
            .into_iter()
            .map(|(region, categories)| {
                let children: Vec<TreemapNode> = categories
                    .into_iter()
                    .map(|(category, subs)| {
                        let leaves: Vec<TreemapNode> = subs
                            .into_iter()
                            .map(|(sub_category, sales)| TreemapNode::leaf(sub_category, sales))
                            .collect();
                        Self::branch(category, leaves)
                    })
                    .collect();
                Self::branch(region, children)
            })
            .collect())
    }

    /// One point per row that has Sales, Profit and Quantity.
    pub fn scatter(ds: &SalesDataset) -> Result<Vec<ScatterPoint>, DataError> {
        let sales = ds.float_values(SALES)?;
        let profit = ds.float_values(PROFIT)?;
        let quantity = ds.int_values(QUANTITY)?;

        Ok(sales
            .into_iter()
            .zip(profit)
            .zip(quantity)
            .filter_map(|((sales, profit), quantity)| {
                Some(ScatterPoint {
                    sales: sales?,
                    profit: profit?,
                    quantity: quantity?,
                })
            })
            .collect())
    }

    fn branch(label: &str, children: Vec<TreemapNode>) -> TreemapNode {
        TreemapNode {
            label: label.to_string(),
            sales: children.iter().map(|child| child.sales).sum(),
            children,
        }
    }
}
