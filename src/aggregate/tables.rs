//! Aggregated views handed to the presenter.

use polars::prelude::*;
use serde::Serialize;

/// One group of an [`AggregateTable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: String,
    pub sales: f64,
}

/// Sales summed per key. Keys are unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTable {
    pub key_column: String,
    pub value_column: String,
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    pub fn new(key_column: &str, value_column: &str, rows: Vec<AggregateRow>) -> Self {
        Self {
            key_column: key_column.to_string(),
            value_column: value_column.to_string(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum over every group.
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|row| row.sales).sum()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.key == key)
            .map(|row| row.sales)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.key.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.sales).collect()
    }

    /// Two-column frame `<key_column>, <value_column>`.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let keys: Vec<&str> = self.keys();
        DataFrame::new(vec![
            Column::new(self.key_column.as_str().into(), keys),
            Column::new(self.value_column.as_str().into(), self.values()),
        ])
    }
}

/// Per-row data of the pivot table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub key: String,
    /// One cell per pivot column; `None` means no transactions.
    pub cells: Vec<Option<f64>>,
}

/// Sub-Category x Month cross tabulation of summed Sales.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub row_column: String,
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value; `None` both for unknown labels and for empty combinations.
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let col_idx = self.columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|r| r.key == row)
            .and_then(|r| r.cells.get(col_idx).copied().flatten())
    }

    /// Frame with the row labels first, then one nullable column per month.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        let keys: Vec<&str> = self.rows.iter().map(|row| row.key.as_str()).collect();
        columns.push(Column::new(self.row_column.as_str().into(), keys));

        for (idx, name) in self.columns.iter().enumerate() {
            let cells: Vec<Option<f64>> = self
                .rows
                .iter()
                .map(|row| row.cells.get(idx).copied().flatten())
                .collect();
            columns.push(Column::new(name.as_str().into(), cells));
        }

        DataFrame::new(columns)
    }
}

/// A level of the Region -> Category -> Sub-Category hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapNode {
    pub label: String,
    pub sales: f64,
    pub children: Vec<TreemapNode>,
}

impl TreemapNode {
    pub fn leaf(label: impl Into<String>, sales: f64) -> Self {
        Self {
            label: label.into(),
            sales,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Sales vs Profit, sized by Quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub sales: f64,
    pub profit: f64,
    pub quantity: i64,
}

/// Stringified head of a frame for tabular display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TablePreview {
    /// First `limit` rows of `df`; nulls become empty strings.
    pub fn from_frame(df: &DataFrame, limit: usize) -> PolarsResult<Self> {
        let head = df.head(Some(limit));
        let columns = head
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut rows = Vec::with_capacity(head.height());
        for i in 0..head.height() {
            let row = head
                .get_columns()
                .iter()
                .map(|column| column.get(i).map(|value| display_value(&value)))
                .collect::<PolarsResult<Vec<String>>>()?;
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn display_value(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string().trim_matches('"').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_table_lookup_and_frame() {
        let table = AggregateTable::new(
            "Category",
            "Sales",
            vec![
                AggregateRow {
                    key: "Furniture".into(),
                    sales: 10.5,
                },
                AggregateRow {
                    key: "Technology".into(),
                    sales: 2.25,
                },
            ],
        );

        assert_eq!(table.get("Technology"), Some(2.25));
        assert_eq!(table.get("Office Supplies"), None);
        assert_eq!(table.total(), 12.75);

        let df = table.to_frame().unwrap();
        assert_eq!(df.shape(), (2, 2));
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, ["Category", "Sales"]);
    }

    #[test]
    fn pivot_keeps_empty_cells_empty() {
        let pivot = PivotTable {
            row_column: "Sub-Category".into(),
            columns: vec!["January".into(), "February".into()],
            rows: vec![PivotRow {
                key: "Chairs".into(),
                cells: vec![Some(5.0), None],
            }],
        };

        assert_eq!(pivot.get("Chairs", "January"), Some(5.0));
        assert_eq!(pivot.get("Chairs", "February"), None);

        let df = pivot.to_frame().unwrap();
        assert_eq!(df.shape(), (1, 3));
        assert_eq!(df.column("February").unwrap().null_count(), 1);
    }

    #[test]
    fn preview_truncates_and_stringifies() {
        let df = DataFrame::new(vec![
            Column::new("City".into(), ["Albany", "Austin", "Salem"]),
            Column::new("Sales".into(), [Some(1.5), None, Some(3.0)]),
        ])
        .unwrap();

        let preview = TablePreview::from_frame(&df, 2).unwrap();
        assert_eq!(preview.columns, ["City", "Sales"]);
        assert_eq!(preview.len(), 2);
        assert_eq!(preview.rows[0][0], "Albany");
        assert_eq!(preview.rows[1][1], "");
    }
}
