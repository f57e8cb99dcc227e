//! Left outer join on a shared key column
//!
//! Keys on the right-hand side are assumed unique but this is not enforced:
//! a left row with several matches is emitted once per match, which inflates
//! any later sum. Duplicate right-hand keys are reported at `warn`, never
//! collapsed.
//!
//! A `Null` key matches nothing, not even a `Null` key on the other side.
//! This differs from a dataframe merge, which pairs NaN keys with each other;
//! a sale without a customer id stays unmatched instead of picking up every
//! customer row that also lacks one.

use std::collections::HashMap;

use crate::error::{EtlError, EtlResult};
use crate::table::{Dataset, ExactKey, Value};

/// Suffixes added to non-key columns present on both sides
const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

/// Keep every `left` row and append the non-key columns of matching `right` rows
pub fn left_join(left: &Dataset, right: &Dataset, key: &str) -> EtlResult<Dataset> {
    let left_key = require_key(left, key, "left")?;
    let right_key = require_key(right, key, "right")?;

    let index = index_by_key(right, right_key);
    let duplicated = index.values().filter(|rows| rows.len() > 1).count();
    if duplicated > 0 {
        log::warn!(
            "{} '{}' values occur more than once on the right-hand side; matching rows will be repeated",
            duplicated,
            key
        );
    }

    let right_cols: Vec<usize> = (0..right.columns().len()).filter(|&i| i != right_key).collect();

    let mut columns: Vec<String> = left.columns().to_vec();
    for &i in &right_cols {
        let name = &right.columns()[i];
        match left.column_index(name) {
            Some(existing) if existing != left_key => {
                columns[existing] = format!("{}{}", name, LEFT_SUFFIX);
                columns.push(format!("{}{}", name, RIGHT_SUFFIX));
            }
            _ => columns.push(name.clone()),
        }
    }

    let mut joined = Dataset::new(columns);
    for row in left.rows() {
        let matches = row[left_key]
            .join_key()
            .and_then(|k| index.get(&k))
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        if matches.is_empty() {
            let mut values = row.clone();
            values.extend(right_cols.iter().map(|_| Value::Null));
            joined.push_row(values);
            continue;
        }

        for &m in matches {
            let right_row = &right.rows()[m];
            let mut values = row.clone();
            values.extend(right_cols.iter().map(|&i| right_row[i].clone()));
            joined.push_row(values);
        }
    }

    log::debug!(
        "Joined on '{}': {} left rows -> {} rows",
        key,
        left.len(),
        joined.len()
    );
    Ok(joined)
}

/// Number of rows [`left_join`] will produce: one per left row without a
/// match, plus one per match otherwise
pub fn expected_join_rows(left: &Dataset, right: &Dataset, key: &str) -> EtlResult<usize> {
    let left_key = require_key(left, key, "left")?;
    let right_key = require_key(right, key, "right")?;
    let index = index_by_key(right, right_key);

    Ok(left
        .rows()
        .iter()
        .map(|row| {
            row[left_key]
                .join_key()
                .and_then(|k| index.get(&k))
                .map_or(1, |m| m.len().max(1))
        })
        .sum())
}

fn require_key(dataset: &Dataset, key: &str, side: &str) -> EtlResult<usize> {
    dataset.column_index(key).ok_or_else(|| {
        EtlError::malformed(
            format!("join on '{}'", key),
            format!("key column missing from {} dataset", side),
        )
    })
}

fn index_by_key(dataset: &Dataset, key_idx: usize) -> HashMap<ExactKey, Vec<usize>> {
    let mut index: HashMap<ExactKey, Vec<usize>> = HashMap::new();
    for (i, row) in dataset.rows().iter().enumerate() {
        if let Some(k) = row[key_idx].join_key() {
            index.entry(k).or_default().push(i);
        }
    }
    index
}
