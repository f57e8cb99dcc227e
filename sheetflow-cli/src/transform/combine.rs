//! Concatenate datasets that may not share a schema

use crate::table::{Dataset, Value};

/// Concatenate datasets in the order given.
///
/// The result carries the union of all columns in first-seen order; a row
/// gets `Null` for every column its own dataset did not have.
pub fn combine<'a, I>(datasets: I) -> Dataset
where
    I: IntoIterator<Item = &'a Dataset>,
{
    let datasets: Vec<&Dataset> = datasets.into_iter().collect();

    let mut columns: Vec<String> = Vec::new();
    for dataset in &datasets {
        for column in dataset.columns() {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }

    let mut combined = Dataset::new(columns.clone());
    for dataset in &datasets {
        let mapping: Vec<Option<usize>> = columns.iter().map(|c| dataset.column_index(c)).collect();
        for row in dataset.rows() {
            let values = mapping
                .iter()
                .map(|idx| idx.map(|i| row[i].clone()).unwrap_or(Value::Null))
                .collect();
            combined.push_row(values);
        }
    }

    log::debug!(
        "Combined {} datasets into {} rows x {} columns",
        datasets.len(),
        combined.len(),
        combined.columns().len()
    );
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_of_columns_and_row_order() {
        let excel = Dataset::from_rows(
            ["id", "name"],
            vec![vec![Value::Int(1), "Ada".into()], vec![Value::Int(2), "Bob".into()]],
        );
        let sql_server = Dataset::from_rows(["id", "dept"], vec![vec![Value::Int(3), "Ops".into()]]);
        let oracle = Dataset::from_rows(
            ["name", "city"],
            vec![vec!["Cy".into(), "Oslo".into()], vec!["Di".into(), Value::Null]],
        );

        let combined = combine([&excel, &sql_server, &oracle]);

        assert_eq!(combined.len(), excel.len() + sql_server.len() + oracle.len());
        assert_eq!(combined.columns(), &["id", "name", "dept", "city"]);
        assert_eq!(
            combined.rows()[2],
            vec![Value::Int(3), Value::Null, "Ops".into(), Value::Null]
        );
        assert_eq!(
            combined.rows()[3],
            vec![Value::Null, "Cy".into(), Value::Null, "Oslo".into()]
        );
    }

    #[test]
    fn test_repeated_header_keeps_both_columns() {
        let excel = Dataset::from_rows(["id", "id"], vec![vec![Value::Int(1), Value::Int(2)]]);
        let sql_server = Dataset::from_rows(["id"], vec![vec![Value::Int(3)]]);

        let combined = combine([&excel, &sql_server]);

        assert_eq!(combined.columns(), &["id", "id.1"]);
        assert_eq!(combined.rows()[0], vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(combined.rows()[1], vec![Value::Int(3), Value::Null]);
    }

    #[test]
    fn test_empty_inputs() {
        let combined = combine([&Dataset::default(), &Dataset::new(["a"])]);
        assert!(combined.is_empty());
        assert_eq!(combined.columns(), &["a"]);
        assert!(combine(std::iter::empty::<&Dataset>()).columns().is_empty());
    }
}
