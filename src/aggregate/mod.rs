//! Aggregate module - groupby sums, pivot and hierarchy

mod aggregator;
mod tables;

pub use aggregator::Aggregator;
pub use tables::{
    AggregateRow, AggregateTable, PivotRow, PivotTable, ScatterPoint, TablePreview, TreemapNode,
};
