//! Microsoft SQL Server source (TDS via tiberius)

use async_trait::async_trait;

use super::Source;
use crate::error::EtlResult;
use crate::table::Dataset;

/// Environment variable consulted when no password is configured
pub const PASSWORD_ENV_VAR: &str = "SHEETFLOW_SQLSERVER_PASSWORD";

#[derive(Debug, Clone)]
pub struct SqlServerSource {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub query: String,
    pub trust_cert: bool,
}

impl SqlServerSource {
    fn name(&self) -> String {
        format!("sqlserver://{}:{}/{}", self.server, self.port, self.database)
    }
}

#[async_trait]
impl Source for SqlServerSource {
    fn describe(&self) -> String {
        format!("{} ({})", self.name(), self.query)
    }

    #[cfg(feature = "mssql")]
    async fn extract(&self) -> EtlResult<Dataset> {
        driver::extract(self).await
    }

    #[cfg(not(feature = "mssql"))]
    async fn extract(&self) -> EtlResult<Dataset> {
        Err(crate::error::EtlError::source_unavailable(
            self.name(),
            "built without SQL Server support (enable the `mssql` feature)",
        ))
    }
}

#[cfg(feature = "mssql")]
mod driver {
    use tiberius::{AuthMethod, Client, ColumnData, Config, FromSql};
    use tokio::net::TcpStream;
    use tokio_util::compat::TokioAsyncWriteCompatExt;

    use super::{PASSWORD_ENV_VAR, SqlServerSource};
    use crate::config::resolve_secret;
    use crate::error::{EtlError, EtlResult};
    use crate::table::{Dataset, Value};

    pub(super) async fn extract(source: &SqlServerSource) -> EtlResult<Dataset> {
        let name = source.name();
        let unavailable = |e: &dyn std::fmt::Display| EtlError::source_unavailable(&name, e);

        let mut config = Config::new();
        config.host(&source.server);
        config.port(source.port);
        config.database(&source.database);
        config.authentication(auth_method(source)?);
        if source.trust_cert {
            config.trust_cert();
        }

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| unavailable(&e))?;
        tcp.set_nodelay(true).map_err(|e| unavailable(&e))?;

        let mut client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| unavailable(&e))?;

        let mut stream = client
            .simple_query(source.query.as_str())
            .await
            .map_err(|e| unavailable(&e))?;
        let columns: Vec<String> = match stream.columns().await.map_err(|e| unavailable(&e))? {
            Some(cols) => cols.iter().map(|c| c.name().to_string()).collect(),
            None => Vec::new(),
        };
        let rows = stream
            .into_first_result()
            .await
            .map_err(|e| unavailable(&e))?;

        if let Err(e) = client.close().await {
            log::warn!("Failed to close connection to {}: {}", name, e);
        }

        let mut dataset = Dataset::new(columns);
        for row in rows {
            let values = row
                .into_iter()
                .map(|data| convert(&data))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| EtlError::malformed(format!("{} query result", name), e))?;
            dataset.push_row(values);
        }
        Ok(dataset)
    }

    /// SQL Server login when a username is configured, the current OS
    /// identity otherwise
    fn auth_method(source: &SqlServerSource) -> EtlResult<AuthMethod> {
        match source.username.as_deref() {
            Some(username) => {
                let password = resolve_secret(
                    source.password.as_deref(),
                    PASSWORD_ENV_VAR,
                    &format!("SQL Server password for {}: ", username),
                )
                .ok_or_else(|| {
                    EtlError::source_unavailable(source.name(), "no password configured")
                })?;
                Ok(AuthMethod::sql_server(username, &password))
            }
            None => integrated_auth(source),
        }
    }

    #[cfg(any(windows, all(unix, feature = "integrated-auth-gssapi")))]
    fn integrated_auth(source: &SqlServerSource) -> EtlResult<AuthMethod> {
        log::debug!("Using integrated authentication for {}", source.name());
        Ok(AuthMethod::Integrated)
    }

    #[cfg(not(any(windows, all(unix, feature = "integrated-auth-gssapi"))))]
    fn integrated_auth(source: &SqlServerSource) -> EtlResult<AuthMethod> {
        Err(EtlError::source_unavailable(
            source.name(),
            "integrated authentication needs the `integrated-auth-gssapi` feature on this \
             platform; enable it or configure a username",
        ))
    }

    fn convert(data: &ColumnData<'static>) -> tiberius::Result<Value> {
        let value: Value = match data {
            ColumnData::U8(v) => v.map(|v| Value::Int(v as i64)).into(),
            ColumnData::I16(v) => v.map(|v| Value::Int(v as i64)).into(),
            ColumnData::I32(v) => v.map(|v| Value::Int(v as i64)).into(),
            ColumnData::I64(v) => (*v).into(),
            ColumnData::F32(v) => v.map(|v| Value::Float(v as f64)).into(),
            ColumnData::F64(v) => (*v).into(),
            ColumnData::Bit(v) => (*v).into(),
            ColumnData::String(v) => v.as_ref().map(|s| s.to_string()).into(),
            ColumnData::Guid(v) => v.map(|g| g.to_string()).into(),
            ColumnData::Numeric(v) => v
                .as_ref()
                .map(|n| Value::Float(n.value() as f64 / 10f64.powi(n.scale() as i32)))
                .into(),
            ColumnData::Xml(v) => v
                .as_ref()
                .map(|x| x.clone().into_owned().into_string())
                .into(),
            ColumnData::Binary(v) => v
                .as_ref()
                .map(|b| b.iter().map(|byte| format!("{:02x}", byte)).collect::<String>())
                .into(),
            ColumnData::Date(_) => chrono::NaiveDate::from_sql(data)?.into(),
            ColumnData::Time(_) => chrono::NaiveTime::from_sql(data)?
                .map(|t| t.to_string())
                .into(),
            ColumnData::DateTimeOffset(_) => chrono::DateTime::<chrono::Utc>::from_sql(data)?
                .map(|dt| dt.naive_utc())
                .into(),
            _ => chrono::NaiveDateTime::from_sql(data)?.into(),
        };
        Ok(value)
    }

}
