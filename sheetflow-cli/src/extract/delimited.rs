//! Read comma-separated files as if they were a single-sheet workbook

use std::path::PathBuf;

use async_trait::async_trait;

use super::Source;
use crate::error::{EtlError, EtlResult};
use crate::table::{Dataset, Value};

#[derive(Debug, Clone)]
pub struct CsvSource {
    pub path: PathBuf,
}

impl CsvSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Source for CsvSource {
    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }

    async fn extract(&self) -> EtlResult<Dataset> {
        let name = self.path.display().to_string();

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| EtlError::source_unavailable(&name, e))?;

        let headers = reader
            .headers()
            .map_err(|e| EtlError::malformed(&name, e))?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = h.trim();
                if h.is_empty() {
                    format!("Unnamed: {}", i)
                } else {
                    h.to_string()
                }
            })
            .collect::<Vec<_>>();

        let mut dataset = Dataset::new(headers);
        for (line, record) in reader.records().enumerate() {
            let record =
                record.map_err(|e| EtlError::malformed(format!("{} record {}", name, line + 1), e))?;
            let values: Vec<Value> = record.iter().map(Value::infer).collect();
            if values.iter().all(Value::is_null) {
                continue;
            }
            dataset.push_row(values);
        }

        Ok(dataset)
    }
}
