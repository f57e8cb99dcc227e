//! Cleaning steps: exact-duplicate removal, null filling and date parsing

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

use crate::error::{EtlError, EtlResult};
use crate::table::{Dataset, ExactKey, Value};

/// Text layouts accepted for date/time cells, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y"];

/// Remove rows that repeat an earlier row in every column.
///
/// The first occurrence is kept. Returns the number of rows removed.
pub fn drop_duplicates(dataset: &mut Dataset) -> usize {
    let before = dataset.len();
    let mut seen: HashSet<Vec<ExactKey>> = HashSet::with_capacity(before);

    dataset
        .rows_mut()
        .retain(|row| seen.insert(row.iter().map(Value::exact_key).collect()));

    let removed = before - dataset.len();
    log::debug!("Removed {} duplicate rows", removed);
    removed
}

/// Replace nulls in `column` with `default`. Returns the number of cells filled.
pub fn fill_missing(dataset: &mut Dataset, column: &str, default: Value) -> EtlResult<usize> {
    let idx = dataset.require_column(column)?;
    let mut filled = 0;

    for row in dataset.rows_mut() {
        if row[idx].is_null() {
            row[idx] = default.clone();
            filled += 1;
        }
    }

    log::debug!("Filled {} missing values in '{}'", filled, column);
    Ok(filled)
}

/// Convert every value in `column` into a date/time.
///
/// Nulls and blank text stay null; numbers are read as Excel serial dates.
/// The first value that cannot be interpreted aborts with `MalformedInput`.
pub fn parse_datetimes(dataset: &mut Dataset, column: &str) -> EtlResult<()> {
    let idx = dataset.require_column(column)?;

    for (row_idx, row) in dataset.rows_mut().iter_mut().enumerate() {
        let parsed = match &row[idx] {
            Value::Null => None,
            Value::DateTime(dt) => Some(*dt),
            Value::Text(s) if s.trim().is_empty() => None,
            Value::Text(s) => Some(parse_datetime_text(s).ok_or_else(|| {
                EtlError::malformed(
                    format!("column '{}' row {}", column, row_idx + 1),
                    format!("cannot parse '{}' as a date", s),
                )
            })?),
            Value::Int(_) | Value::Float(_) => {
                let serial = row[idx].as_float().unwrap_or_default();
                Some(excel_serial_to_datetime(serial).ok_or_else(|| {
                    EtlError::malformed(
                        format!("column '{}' row {}", column, row_idx + 1),
                        format!("{} is not a valid spreadsheet date", serial),
                    )
                })?)
            }
            Value::Bool(b) => {
                return Err(EtlError::malformed(
                    format!("column '{}' row {}", column, row_idx + 1),
                    format!("cannot parse '{}' as a date", b),
                ));
            }
        };

        row[idx] = parsed.map(Value::DateTime).unwrap_or(Value::Null);
    }

    Ok(())
}

/// Parse a textual date or date/time
pub fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Days since 1899-12-30, with the fraction as time of day
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > 2_958_465.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}
