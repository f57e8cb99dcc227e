//! Read sheets from spreadsheet files (xlsx, xlsm, xlsb, xls, ods)

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};

use super::Source;
use crate::error::{EtlError, EtlResult};
use crate::table::{Dataset, Value};
use crate::transform::clean::parse_datetime_text;

/// One sheet of a workbook; the first sheet when no name is given
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    pub path: PathBuf,
    pub sheet: Option<String>,
}

impl WorkbookSource {
    pub fn new(path: PathBuf, sheet: Option<String>) -> Self {
        Self { path, sheet }
    }
}

#[async_trait]
impl Source for WorkbookSource {
    fn describe(&self) -> String {
        match &self.sheet {
            Some(sheet) => format!("workbook {} (sheet '{}')", self.path.display(), sheet),
            None => format!("workbook {} (first sheet)", self.path.display()),
        }
    }

    async fn extract(&self) -> EtlResult<Dataset> {
        let mut workbook = open(&self.path)?;

        let sheet_name = match &self.sheet {
            Some(name) => name.clone(),
            None => workbook.sheet_names().first().cloned().ok_or_else(|| {
                EtlError::malformed(self.path.display().to_string(), "workbook has no sheets")
            })?,
        };

        read_sheet(&mut workbook, &self.path, &sheet_name)
    }
}

/// Read several named sheets from one workbook, in the order requested
pub fn read_sheets(path: &Path, names: &[&str]) -> EtlResult<Vec<Dataset>> {
    let mut workbook = open(path)?;
    names
        .iter()
        .map(|name| read_sheet(&mut workbook, path, name))
        .collect()
}

fn open(path: &Path) -> EtlResult<Sheets<std::io::BufReader<std::fs::File>>> {
    if !path.exists() {
        return Err(EtlError::source_unavailable(
            path.display().to_string(),
            "file does not exist",
        ));
    }

    open_workbook_auto(path)
        .map_err(|e| EtlError::source_unavailable(path.display().to_string(), e))
}

fn read_sheet(
    workbook: &mut Sheets<std::io::BufReader<std::fs::File>>,
    path: &Path,
    sheet_name: &str,
) -> EtlResult<Dataset> {
    if !workbook.sheet_names().iter().any(|s| s == sheet_name) {
        return Err(EtlError::malformed(
            path.display().to_string(),
            format!("sheet '{}' not found", sheet_name),
        ));
    }

    let range = workbook.worksheet_range(sheet_name).map_err(|e| {
        EtlError::malformed(format!("{} sheet '{}'", path.display(), sheet_name), e)
    })?;

    let dataset = range_to_dataset(&range);
    log::debug!(
        "Read sheet '{}' from {}: {} rows x {} columns",
        sheet_name,
        path.display(),
        dataset.len(),
        dataset.columns().len()
    );
    Ok(dataset)
}

/// First row is the header; fully empty rows are skipped
pub(crate) fn range_to_dataset(range: &Range<Data>) -> Dataset {
    let mut rows = range.rows();

    let header = match rows.next() {
        Some(header) => header,
        None => return Dataset::default(),
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell_value(cell) {
            Value::Null => format!("Unnamed: {}", i),
            value => value.label(),
        })
        .collect();

    let mut dataset = Dataset::new(columns);
    for row in rows {
        let values: Vec<Value> = row.iter().map(cell_value).collect();
        if values.iter().all(Value::is_null) {
            continue;
        }
        dataset.push_row(values);
    }
    dataset
}

fn cell_value(cell: &Data) -> Value {
    #[allow(unreachable_patterns)]
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Value::DateTime)
            .unwrap_or(Value::Float(dt.as_f64())),
        Data::DateTimeIso(s) => parse_datetime_text(s)
            .map(Value::DateTime)
            .unwrap_or_else(|| Value::Text(s.clone())),
        Data::DurationIso(s) => Value::Text(s.clone()),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::WorkbookWriter;
    use chrono::NaiveDate;

    #[test]
    fn test_range_to_dataset() {
        let mut range = Range::new((0, 0), (3, 2));
        range.set_value((0, 0), Data::String("CustomerID".into()));
        range.set_value((0, 1), Data::String("Name".into()));
        range.set_value((1, 0), Data::Float(1.0));
        range.set_value((1, 1), Data::String("X".into()));
        // row 2 left empty
        range.set_value((3, 0), Data::Int(2));
        range.set_value((3, 2), Data::Bool(true));

        let ds = range_to_dataset(&range);
        assert_eq!(ds.columns(), &["CustomerID", "Name", "Unnamed: 2"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(0, "CustomerID"), Some(&Value::Float(1.0)));
        assert_eq!(ds.get(1, "Name"), Some(&Value::Null));
        assert_eq!(ds.get(1, "Unnamed: 2"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_repeated_header_cells() {
        let mut range = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("id".into()));
        range.set_value((0, 1), Data::String("id".into()));
        range.set_value((1, 0), Data::Int(1));
        range.set_value((1, 1), Data::Int(2));

        let ds = range_to_dataset(&range);
        assert_eq!(ds.columns(), &["id", "id.1"]);
        assert_eq!(ds.rows()[0], vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let err = read_sheets(Path::new("/nonexistent/sales.xlsx"), &["Sales"]).unwrap_err();
        assert_eq!(err.kind(), "SourceUnavailable");
    }

    #[tokio::test]
    async fn test_reads_first_sheet_and_named_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");

        let first = Dataset::from_rows(
            ["Product", "Price"],
            vec![vec!["A".into(), Value::Float(10.0)], vec!["B".into(), Value::Float(5.0)]],
        );
        let order_date = NaiveDate::from_ymd_opt(2024, 2, 14)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let second = Dataset::from_rows(["OrderDate"], vec![vec![Value::DateTime(order_date)]]);

        let mut writer = WorkbookWriter::new();
        writer.add_dataset("Products", &first).unwrap();
        writer.add_dataset("Orders", &second).unwrap();
        writer.save(&path).unwrap();

        let source = WorkbookSource::new(path.clone(), None);
        assert_eq!(source.extract().await.unwrap(), first);

        let sheets = read_sheets(&path, &["Orders", "Products"]).unwrap();
        assert_eq!(sheets[0].get(0, "OrderDate"), Some(&Value::DateTime(order_date)));
        assert_eq!(sheets[1], first);

        let err = read_sheets(&path, &["Customers"]).unwrap_err();
        assert_eq!(err.kind(), "MalformedInput");
    }
}
