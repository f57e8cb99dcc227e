//! Aggregated views over a dataset

use super::{Dataset, Value};

/// Totals grouped by one dimension, in group order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    pub dimension: String,
    pub measure: String,
    pub groups: Vec<(String, f64)>,
}

impl Summary {
    pub fn new(dimension: impl Into<String>, measure: impl Into<String>) -> Self {
        Self {
            dimension: dimension.into(),
            measure: measure.into(),
            groups: Vec::new(),
        }
    }

    /// Total for one group label
    pub fn get(&self, label: &str) -> Option<f64> {
        self.groups
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, total)| *total)
    }

    pub fn total(&self) -> f64 {
        self.groups.iter().map(|(_, total)| total).sum()
    }

    pub fn to_dataset(&self) -> Dataset {
        let rows = self
            .groups
            .iter()
            .map(|(label, total)| vec![Value::Text(label.clone()), Value::Float(*total)])
            .collect();
        Dataset::from_rows([self.dimension.as_str(), self.measure.as_str()], rows)
    }
}

/// Totals grouped by two dimensions, stored as a dense matrix
///
/// Combinations that never occur in the data hold `0.0`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PivotTable {
    pub row_dimension: String,
    pub column_dimension: String,
    pub measure: String,
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub cells: Vec<Vec<f64>>,
}

impl PivotTable {
    /// Cell for a (row, column) label pair
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.row_labels.iter().position(|l| l == row)?;
        let c = self.column_labels.iter().position(|l| l == column)?;
        Some(self.cells[r][c])
    }

    pub fn grand_total(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }

    /// Totals per column label (collapsing the row dimension)
    pub fn column_totals(&self) -> Vec<(String, f64)> {
        self.column_labels
            .iter()
            .enumerate()
            .map(|(c, label)| (label.clone(), self.cells.iter().map(|row| row[c]).sum()))
            .collect()
    }

    /// Flatten into a dataset: first column holds row labels, then one
    /// column per column label
    pub fn to_dataset(&self) -> Dataset {
        let mut columns = vec![self.row_dimension.clone()];
        columns.extend(self.column_labels.iter().cloned());

        let rows = self
            .row_labels
            .iter()
            .zip(&self.cells)
            .map(|(label, cells)| {
                let mut row = vec![Value::Text(label.clone())];
                row.extend(cells.iter().map(|c| Value::Float(*c)));
                row
            })
            .collect();

        Dataset::from_rows(columns, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pivot() -> PivotTable {
        PivotTable {
            row_dimension: "Region".into(),
            column_dimension: "Product".into(),
            measure: "TotalRevenue".into(),
            row_labels: vec!["East".into(), "West".into()],
            column_labels: vec!["A".into(), "B".into()],
            cells: vec![vec![20.0, 0.0], vec![5.0, 7.5]],
        }
    }

    #[test]
    fn test_pivot_lookup_and_totals() {
        let p = pivot();
        assert_eq!(p.get("West", "B"), Some(7.5));
        assert_eq!(p.get("North", "A"), None);
        assert_eq!(p.grand_total(), 32.5);
        assert_eq!(
            p.column_totals(),
            vec![("A".to_string(), 25.0), ("B".to_string(), 7.5)]
        );
    }

    #[test]
    fn test_pivot_to_dataset() {
        let ds = pivot().to_dataset();
        assert_eq!(ds.columns(), &["Region", "A", "B"]);
        assert_eq!(ds.get(0, "Region"), Some(&Value::Text("East".into())));
        assert_eq!(ds.get(1, "B"), Some(&Value::Float(7.5)));
    }

    #[test]
    fn test_summary_to_dataset() {
        let mut s = Summary::new("Product", "TotalRevenue");
        s.groups.push(("A".into(), 20.0));
        s.groups.push(("B".into(), 0.0));
        assert_eq!(s.get("A"), Some(20.0));
        assert_eq!(s.total(), 20.0);
        assert_eq!(s.to_dataset().len(), 2);
    }
}
