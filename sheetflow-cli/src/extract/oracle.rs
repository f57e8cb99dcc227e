//! Oracle source (OCI via the `oracle` crate)
//!
//! The driver is blocking, so the query runs on tokio's blocking pool and the
//! connection is closed on that thread once the rows are read.

use async_trait::async_trait;

use super::Source;
use crate::error::EtlResult;
use crate::table::Dataset;

/// Environment variable consulted when no password is configured
pub const PASSWORD_ENV_VAR: &str = "SHEETFLOW_ORACLE_PASSWORD";

#[derive(Debug, Clone)]
pub struct OracleSource {
    pub username: String,
    pub password: Option<String>,
    pub dsn: String,
    pub query: String,
}

impl OracleSource {
    fn name(&self) -> String {
        format!("oracle://{}@{}", self.username, self.dsn)
    }
}

#[async_trait]
impl Source for OracleSource {
    fn describe(&self) -> String {
        format!("{} ({})", self.name(), self.query)
    }

    #[cfg(feature = "oracle")]
    async fn extract(&self) -> EtlResult<Dataset> {
        use crate::config::resolve_secret;
        use crate::error::EtlError;

        let name = self.name();
        let password = resolve_secret(
            self.password.as_deref(),
            PASSWORD_ENV_VAR,
            &format!("Oracle password for {}: ", self.username),
        )
        .ok_or_else(|| EtlError::source_unavailable(&name, "no password configured"))?;

        let source = self.clone();
        tokio::task::spawn_blocking(move || driver::extract(&source, &password))
            .await
            .map_err(|e| EtlError::source_unavailable(&name, e))?
    }

    #[cfg(not(feature = "oracle"))]
    async fn extract(&self) -> EtlResult<Dataset> {
        Err(crate::error::EtlError::source_unavailable(
            self.name(),
            "built without Oracle support (enable the `oracle` feature)",
        ))
    }
}

#[cfg(feature = "oracle")]
mod driver {
    use ::oracle::sql_type::OracleType;
    use ::oracle::{Connection, SqlValue};

    use super::OracleSource;
    use crate::error::{EtlError, EtlResult};
    use crate::table::{Dataset, Value};

    pub(super) fn extract(source: &OracleSource, password: &str) -> EtlResult<Dataset> {
        let name = source.name();

        let conn = Connection::connect(&source.username, password, &source.dsn)
            .map_err(|e| EtlError::source_unavailable(&name, e))?;

        let dataset = read(&conn, &source.query).map_err(|e| match e {
            ReadError::Driver(e) => EtlError::source_unavailable(&name, e),
            ReadError::Value(e) => EtlError::malformed(format!("{} query result", name), e),
        });

        if let Err(e) = conn.close() {
            log::warn!("Failed to close connection to {}: {}", name, e);
        }

        dataset
    }

    enum ReadError {
        Driver(::oracle::Error),
        Value(::oracle::Error),
    }

    fn read(conn: &Connection, query: &str) -> Result<Dataset, ReadError> {
        let rows = conn.query(query, &[]).map_err(ReadError::Driver)?;
        let columns: Vec<String> = rows
            .column_info()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let mut dataset = Dataset::new(columns);
        for row in rows {
            let row = row.map_err(ReadError::Driver)?;
            let values = row
                .sql_values()
                .iter()
                .map(convert)
                .collect::<Result<Vec<_>, _>>()
                .map_err(ReadError::Value)?;
            dataset.push_row(values);
        }
        Ok(dataset)
    }

    fn convert(value: &SqlValue) -> ::oracle::Result<Value> {
        if value.is_null()? {
            return Ok(Value::Null);
        }

        let converted = match value.oracle_type()? {
            OracleType::Number(precision, 0) if *precision > 0 && *precision <= 18 => {
                Value::Int(value.get::<i64>()?)
            }
            OracleType::Int64 => Value::Int(value.get::<i64>()?),
            OracleType::Number(_, _)
            | OracleType::Float(_)
            | OracleType::BinaryFloat
            | OracleType::BinaryDouble => Value::Float(value.get::<f64>()?),
            OracleType::Date | OracleType::Timestamp(_) => {
                Value::DateTime(value.get::<chrono::NaiveDateTime>()?)
            }
            OracleType::TimestampTZ(_) | OracleType::TimestampLTZ(_) => Value::DateTime(
                value
                    .get::<chrono::DateTime<chrono::Utc>>()?
                    .naive_utc(),
            ),
            OracleType::Boolean => Value::Bool(value.get::<bool>()?),
            _ => Value::Text(value.get::<String>()?),
        };
        Ok(converted)
    }
}
