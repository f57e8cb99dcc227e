//! Group-and-sum summaries
//!
//! Missing measures count as zero. Rows whose grouping value is missing are
//! left out of the summary entirely.
//!
//! [`monthly_sum`] lists months in calendar order, January to December. A
//! plain group-by on the month name would sort them alphabetically (April,
//! August, December, ...); the calendar order is what the trend chart needs.

use std::collections::{BTreeMap, HashMap};

use crate::error::EtlResult;
use crate::table::{Dataset, ExactKey, PivotTable, Summary};

use super::derive::{MONTH_NAMES, month_index, month_name};

/// Sum `measure` per distinct value of `group`, in first-seen order
pub fn sum_by(dataset: &Dataset, measure: &str, group: &str) -> EtlResult<Summary> {
    let measure_idx = dataset.require_column(measure)?;
    let group_idx = dataset.require_column(group)?;

    let mut summary = Summary::new(group, measure);
    let mut positions: HashMap<ExactKey, usize> = HashMap::new();

    for row in dataset.rows() {
        let Some(key) = row[group_idx].join_key() else {
            continue;
        };
        let amount = row[measure_idx].as_float().unwrap_or(0.0);

        let pos = *positions.entry(key).or_insert_with(|| {
            summary.groups.push((row[group_idx].label(), 0.0));
            summary.groups.len() - 1
        });
        summary.groups[pos].1 += amount;
    }

    Ok(summary)
}

/// Sum `measure` over every (`rows`, `columns`) combination.
///
/// Labels on both axes are sorted; combinations without data are `0.0`.
pub fn pivot_sum(
    dataset: &Dataset,
    measure: &str,
    rows: &str,
    columns: &str,
) -> EtlResult<PivotTable> {
    let measure_idx = dataset.require_column(measure)?;
    let row_idx = dataset.require_column(rows)?;
    let col_idx = dataset.require_column(columns)?;

    let mut row_labels: BTreeMap<ExactKey, String> = BTreeMap::new();
    let mut col_labels: BTreeMap<ExactKey, String> = BTreeMap::new();
    let mut totals: HashMap<(ExactKey, ExactKey), f64> = HashMap::new();

    for row in dataset.rows() {
        let (Some(r), Some(c)) = (row[row_idx].join_key(), row[col_idx].join_key()) else {
            continue;
        };
        row_labels.entry(r.clone()).or_insert_with(|| row[row_idx].label());
        col_labels.entry(c.clone()).or_insert_with(|| row[col_idx].label());
        *totals.entry((r, c)).or_insert(0.0) += row[measure_idx].as_float().unwrap_or(0.0);
    }

    let cells = row_labels
        .keys()
        .map(|r| {
            col_labels
                .keys()
                .map(|c| {
                    totals
                        .get(&(r.clone(), c.clone()))
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect()
        })
        .collect();

    Ok(PivotTable {
        row_dimension: rows.to_string(),
        column_dimension: columns.to_string(),
        measure: measure.to_string(),
        row_labels: row_labels.into_values().collect(),
        column_labels: col_labels.into_values().collect(),
        cells,
    })
}

/// Sum `measure` per calendar month of `date_column`, January first.
///
/// Months of different years fall into the same group.
pub fn monthly_sum(dataset: &Dataset, measure: &str, date_column: &str) -> EtlResult<Summary> {
    let measure_idx = dataset.require_column(measure)?;
    let date_idx = dataset.require_column(date_column)?;

    let mut totals = [None::<f64>; 12];
    for row in dataset.rows() {
        let Some(slot) = month_name(&row[date_idx]).and_then(month_index) else {
            continue;
        };
        *totals[slot].get_or_insert(0.0) += row[measure_idx].as_float().unwrap_or(0.0);
    }

    let mut summary = Summary::new("Month", measure);
    summary.groups = MONTH_NAMES
        .iter()
        .zip(totals)
        .filter_map(|(name, total)| total.map(|t| (name.to_string(), t)))
        .collect();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> Value {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().into()
    }

    fn revenue() -> Dataset {
        Dataset::from_rows(
            ["Region", "Product", "OrderDate", "TotalRevenue"],
            vec![
                vec!["West".into(), "B".into(), day(2024, 3, 2), Value::Float(5.0)],
                vec!["East".into(), "A".into(), day(2024, 1, 5), Value::Float(20.0)],
                vec!["East".into(), "A".into(), day(2023, 1, 9), Value::Float(4.0)],
                vec!["West".into(), "A".into(), day(2024, 11, 1), Value::Null],
                vec![Value::Null, "B".into(), day(2024, 3, 3), Value::Float(100.0)],
            ],
        )
    }

    #[test]
    fn test_sum_by_keeps_first_seen_order() {
        let summary = sum_by(&revenue(), "TotalRevenue", "Product").unwrap();
        assert_eq!(
            summary.groups,
            vec![("B".to_string(), 105.0), ("A".to_string(), 24.0)]
        );
    }

    #[test]
    fn test_pivot_fills_missing_with_zero() {
        let pivot = pivot_sum(&revenue(), "TotalRevenue", "Region", "Product").unwrap();

        assert_eq!(pivot.row_labels, vec!["East", "West"]);
        assert_eq!(pivot.column_labels, vec!["A", "B"]);
        assert_eq!(pivot.get("East", "A"), Some(24.0));
        assert_eq!(pivot.get("East", "B"), Some(0.0));
        assert_eq!(pivot.get("West", "A"), Some(0.0));
        assert_eq!(pivot.get("West", "B"), Some(5.0));
        // the row without a region is not part of any cell
        assert_eq!(pivot.grand_total(), 29.0);
    }

    #[test]
    fn test_pivot_sorts_numeric_labels_numerically() {
        let ds = Dataset::from_rows(
            ["Store", "Product", "TotalRevenue"],
            vec![
                vec![Value::Float(10.0), "A".into(), Value::Float(1.0)],
                vec![Value::Float(9.0), "A".into(), Value::Float(2.0)],
            ],
        );
        let pivot = pivot_sum(&ds, "TotalRevenue", "Store", "Product").unwrap();
        assert_eq!(pivot.row_labels, vec!["9", "10"]);
    }

    #[test]
    fn test_monthly_sum_is_calendar_ordered() {
        let summary = monthly_sum(&revenue(), "TotalRevenue", "OrderDate").unwrap();
        assert_eq!(
            summary.groups,
            vec![
                ("January".to_string(), 24.0),
                ("March".to_string(), 105.0),
                ("November".to_string(), 0.0),
            ]
        );
    }
}
