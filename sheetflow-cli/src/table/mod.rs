//! In-memory tabular datasets
//!
//! A [`Dataset`] is an ordered list of column names plus ordered rows whose
//! cells line up with those columns. Every extract step produces one, the
//! transform steps reshape it and the load/export steps consume it.
//!
//! Column names are unique within a dataset. A repeated name gets a numeric
//! suffix when the dataset is built (`id`, `id.1`, `id.2`).

pub mod summary;
pub mod value;

pub use summary::{PivotTable, Summary};
pub use value::{ExactKey, Value};

use std::collections::HashMap;

use crate::error::{EtlError, EtlResult};

/// Ordered rows sharing one column list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Create an empty dataset with the given columns, renaming repeats
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: unique_column_names(columns.into_iter().map(Into::into)),
            rows: Vec::new(),
        }
    }

    /// Create a dataset from columns and rows
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dataset = Self::new(columns);
        for row in rows {
            dataset.push_row(row);
        }
        dataset
    }

    /// Append a row, padding with nulls or truncating to the column count
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<Value>> {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, if present
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Position of a column, failing with `MalformedInput` if absent
    pub fn require_column(&self, name: &str) -> EtlResult<usize> {
        self.column_index(name).ok_or_else(|| {
            EtlError::malformed(
                format!("column '{}'", name),
                format!("column not found (available: {})", self.columns.join(", ")),
            )
        })
    }

    /// Cell at `row` in `column`
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Iterate over one column's values
    pub fn column_values<'a>(&'a self, column: &str) -> EtlResult<impl Iterator<Item = &'a Value> + 'a> {
        let idx = self.require_column(column)?;
        Ok(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Replace a column's values, appending the column if it does not exist
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> EtlResult<()> {
        if values.len() != self.rows.len() {
            return Err(EtlError::malformed(
                format!("column '{}'", name),
                format!("expected {} values, got {}", self.rows.len(), values.len()),
            ));
        }

        let idx = match self.column_index(name) {
            Some(idx) => idx,
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(Value::Null);
                }
                self.columns.len() - 1
            }
        };

        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
        Ok(())
    }

    /// Keep only the named columns, in the order given
    pub fn select(&self, columns: &[&str]) -> EtlResult<Dataset> {
        let indices = columns
            .iter()
            .map(|c| self.require_column(c))
            .collect::<EtlResult<Vec<_>>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Dataset {
            columns: unique_column_names(columns.iter().map(|c| c.to_string())),
            rows,
        })
    }

    /// Fixed-width text rendering of the first `limit` rows
    pub fn preview(&self, limit: usize) -> String {
        let shown: Vec<Vec<String>> = self
            .rows
            .iter()
            .take(limit)
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &shown {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = w))
            .collect();
        out.push_str(header.join("  ").trim_end());
        out.push('\n');

        for row in &shown {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = w))
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }

        if self.rows.len() > limit {
            out.push_str(&format!("... {} more rows\n", self.rows.len() - limit));
        }
        out
    }
}

/// Suffix repeated names with `.1`, `.2`, ... skipping suffixed names that
/// are already taken
fn unique_column_names<I>(columns: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    columns
        .into_iter()
        .map(|mut name| {
            let mut count = seen.get(&name).copied().unwrap_or(0);
            while count > 0 {
                seen.insert(name.clone(), count + 1);
                name = format!("{}.{}", name, count);
                count = seen.get(&name).copied().unwrap_or(0);
            }
            seen.insert(name.clone(), 1);
            name
        })
        .collect()
}
