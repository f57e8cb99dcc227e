//! Derived columns

use chrono::Datelike;

use crate::error::EtlResult;
use crate::table::{Dataset, Value};

pub const MONTH_NAMES: [&str; 12] = [
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

/// `output = a * b` for every row; null when either side is missing or not a number
pub fn multiply_columns(dataset: &mut Dataset, a: &str, b: &str, output: &str) -> EtlResult<()> {
    let a_idx = dataset.require_column(a)?;
    let b_idx = dataset.require_column(b)?;

    let products: Vec<Value> = dataset
        .rows()
        .iter()
        .map(|row| match (row[a_idx].as_float(), row[b_idx].as_float()) {
            (Some(x), Some(y)) => Value::Float(x * y),
            _ => Value::Null,
        })
        .collect();

    dataset.set_column(output, products)
}

/// Calendar month name of a date/time value
pub fn month_name(value: &Value) -> Option<&'static str> {
    value
        .as_datetime()
        .map(|dt| MONTH_NAMES[dt.month0() as usize])
}

/// Position of a month name in the calendar (January = 0)
pub fn month_index(name: &str) -> Option<usize> {
    MONTH_NAMES.iter().position(|m| *m == name)
}

/// Add a column holding the month name of `date_column`
pub fn add_month_column(dataset: &mut Dataset, date_column: &str, output: &str) -> EtlResult<()> {
    let months: Vec<Value> = dataset
        .column_values(date_column)?
        .map(|v| month_name(v).map(Value::from).unwrap_or(Value::Null))
        .collect();
    dataset.set_column(output, months)
}
