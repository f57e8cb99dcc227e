//! Extract step: turn a source descriptor into a [`Dataset`]
//!
//! Relational sources open one connection for their single query and release
//! it before returning. Nothing is pooled or shared between sources.

pub mod delimited;
pub mod mssql;
pub mod oracle;
pub mod sql;
pub mod workbook;

pub use self::delimited::CsvSource;
pub use self::mssql::SqlServerSource;
pub use self::oracle::OracleSource;
pub use self::sql::SqlSource;
pub use self::workbook::{WorkbookSource, read_sheets};

use async_trait::async_trait;

use crate::config::SourceConfig;
use crate::error::EtlResult;
use crate::table::Dataset;

/// Something rows can be read from
#[async_trait]
pub trait Source: Send + Sync {
    /// Human readable description used in logs and errors
    fn describe(&self) -> String;

    /// Read the whole source into memory
    async fn extract(&self) -> EtlResult<Dataset>;
}

/// Build the source described by a config entry
pub fn source_from_config(config: &SourceConfig) -> Box<dyn Source> {
    match config {
        SourceConfig::Workbook { path, sheet } => {
            let is_csv = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
            if is_csv {
                Box::new(CsvSource::new(path.clone()))
            } else {
                Box::new(WorkbookSource::new(path.clone(), sheet.clone()))
            }
        }
        SourceConfig::SqlServer {
            server,
            port,
            database,
            username,
            password,
            query,
            trust_cert,
        } => Box::new(SqlServerSource {
            server: server.clone(),
            port: *port,
            database: database.clone(),
            username: username.clone(),
            password: password.clone(),
            query: query.clone(),
            trust_cert: *trust_cert,
        }),
        SourceConfig::Oracle {
            username,
            password,
            dsn,
            query,
        } => Box::new(OracleSource {
            username: username.clone(),
            password: password.clone(),
            dsn: dsn.clone(),
            query: query.clone(),
        }),
        SourceConfig::Sql { url, query } => Box::new(SqlSource::new(url.clone(), query.clone())),
    }
}

/// Strip credentials from a connection URL before it is logged
pub(crate) fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
