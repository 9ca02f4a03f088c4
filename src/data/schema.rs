//! Column names of the sales records.
//! Headers are matched exactly (case and spelling).

pub const ORDER_DATE: &str = "Order Date";
pub const REGION: &str = "Region";
pub const STATE: &str = "State";
pub const CITY: &str = "City";
pub const CATEGORY: &str = "Category";
pub const SUB_CATEGORY: &str = "Sub-Category";
pub const SEGMENT: &str = "Segment";
pub const SALES: &str = "Sales";
pub const PROFIT: &str = "Profit";
pub const QUANTITY: &str = "Quantity";

/// Every column the dashboard reads, in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    ORDER_DATE,
    REGION,
    STATE,
    CITY,
    CATEGORY,
    SUB_CATEGORY,
    SEGMENT,
    SALES,
    PROFIT,
    QUANTITY,
];

/// Text dimensions used for grouping and filtering.
pub const CATEGORICAL_COLUMNS: [&str; 6] = [REGION, STATE, CITY, CATEGORY, SUB_CATEGORY, SEGMENT];

/// Floating point measures.
pub const MEASURE_COLUMNS: [&str; 2] = [SALES, PROFIT];

/// Columns shown in the summary preview table.
pub const SUMMARY_COLUMNS: [&str; 7] = [REGION, STATE, CITY, CATEGORY, SALES, PROFIT, QUANTITY];

/// Header of the time series extract.
pub const MONTH_YEAR: &str = "Month_Year";
