//! Query any store sqlx can reach through a URL (sqlite, postgres, mysql)

use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::{AnyConnection, Column, Connection, Executor, Row};

use super::{Source, redact_url};
use crate::error::{EtlError, EtlResult};
use crate::table::{Dataset, Value};

#[derive(Debug, Clone)]
pub struct SqlSource {
    pub url: String,
    pub query: String,
}

impl SqlSource {
    pub fn new(url: String, query: String) -> Self {
        Self { url, query }
    }
}

#[async_trait]
impl Source for SqlSource {
    fn describe(&self) -> String {
        format!("{} ({})", redact_url(&self.url), self.query)
    }

    async fn extract(&self) -> EtlResult<Dataset> {
        let name = redact_url(&self.url);
        let mut conn = connect(&self.url)
            .await
            .map_err(|e| EtlError::source_unavailable(&name, e))?;

        let result = sqlx::query(&self.query).fetch_all(&mut conn).await;

        // No rows to take the header from, so ask the server for the result shape
        let described = match &result {
            Ok(rows) if rows.is_empty() => Some(describe_columns(&mut conn, &self.query).await),
            _ => None,
        };

        // Release the connection before looking at the result
        if let Err(e) = conn.close().await {
            log::warn!("Failed to close connection to {}: {}", name, e);
        }

        let rows = result.map_err(|e| EtlError::source_unavailable(&name, e))?;
        let columns = match (rows.first(), described) {
            (Some(row), _) => column_names(row),
            (None, Some(Ok(columns))) => columns,
            (None, Some(Err(e))) => {
                log::warn!("Could not describe the empty result from {}: {}", name, e);
                Vec::new()
            }
            (None, None) => Vec::new(),
        };

        rows_to_dataset(columns, &rows)
            .map_err(|e| EtlError::malformed(format!("{} query result", name), e))
    }
}

async fn describe_columns(conn: &mut AnyConnection, query: &str) -> Result<Vec<String>, sqlx::Error> {
    let description = conn.describe(query).await?;
    Ok(description
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect())
}

fn column_names(row: &AnyRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

/// Open a single connection, registering the compiled-in drivers first
pub(crate) async fn connect(url: &str) -> Result<AnyConnection, sqlx::Error> {
    sqlx::any::install_default_drivers();
    AnyConnection::connect(url).await
}

fn rows_to_dataset(columns: Vec<String>, rows: &[AnyRow]) -> Result<Dataset, sqlx::Error> {
    let mut dataset = Dataset::new(columns);
    for row in rows {
        let values = (0..row.len())
            .map(|i| decode(row, i))
            .collect::<Result<Vec<_>, _>>()?;
        dataset.push_row(values);
    }
    Ok(dataset)
}

/// The Any driver only exposes a handful of value kinds, so try them in turn
fn decode(row: &AnyRow, i: usize) -> Result<Value, sqlx::Error> {
    if let Ok(v) = row.try_get::<Option<i64>, _>(i) {
        return Ok(v.into());
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(i) {
        return Ok(v.into());
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(i) {
        return Ok(v.into());
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(i) {
        return Ok(v.into());
    }
    let bytes = row.try_get::<Option<Vec<u8>>, _>(i)?;
    Ok(bytes
        .map(|b| Value::Text(b.iter().map(|byte| format!("{:02x}", byte)).collect()))
        .unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(url: &str) {
        let mut conn = connect(url).await.unwrap();
        sqlx::query("CREATE TABLE employees (id INTEGER, name TEXT, salary REAL)")
            .execute(&mut conn)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO employees VALUES (1, 'Ada', 5200.5), (2, 'Grace', NULL), (3, NULL, 4100.0)",
        )
        .execute(&mut conn)
        .await
        .unwrap();
        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_extracts_query_result() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("hr.db").display());
        seed(&url).await;

        let source = SqlSource::new(url, "SELECT * FROM employees ORDER BY id".into());
        let ds = source.extract().await.unwrap();

        assert_eq!(ds.columns(), &["id", "name", "salary"]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.get(0, "id"), Some(&Value::Int(1)));
        assert_eq!(ds.get(0, "salary"), Some(&Value::Float(5200.5)));
        assert_eq!(ds.get(1, "salary"), Some(&Value::Null));
        assert_eq!(ds.get(2, "name"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_empty_result_keeps_columns() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("hr.db").display());
        seed(&url).await;

        let source = SqlSource::new(url, "SELECT id, name FROM employees WHERE id > 100".into());
        let ds = source.extract().await.unwrap();

        assert!(ds.is_empty());
        assert_eq!(ds.columns(), &["id", "name"]);
    }

    #[tokio::test]
    async fn test_duplicate_result_columns_are_renamed() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("hr.db").display());
        seed(&url).await;

        let source = SqlSource::new(url, "SELECT id, name, id FROM employees WHERE id = 1".into());
        let ds = source.extract().await.unwrap();

        assert_eq!(ds.columns(), &["id", "name", "id.1"]);
        assert_eq!(ds.rows()[0], vec![Value::Int(1), "Ada".into(), Value::Int(1)]);
    }

    #[tokio::test]
    async fn test_invalid_query_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("empty.db").display());

        let source = SqlSource::new(url, "SELECT * FROM missing_table".into());
        let err = source.extract().await.unwrap_err();
        assert_eq!(err.kind(), "SourceUnavailable");
    }
}
