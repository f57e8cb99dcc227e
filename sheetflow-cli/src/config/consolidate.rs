//! Options for the cross-source consolidation pipeline

use std::path::PathBuf;

use serde::Deserialize;

/// Sources to read (in order) and where the combined rows go
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsolidateConfig {
    pub sources: Vec<SourceConfig>,
    pub target: TargetConfig,
}

impl Default for ConsolidateConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                SourceConfig::Workbook {
                    path: PathBuf::from("data.xlsx"),
                    sheet: None,
                },
                SourceConfig::SqlServer {
                    server: "localhost".to_string(),
                    port: default_sql_server_port(),
                    database: "SampleDB".to_string(),
                    username: None,
                    password: None,
                    query: "SELECT * FROM Employees".to_string(),
                    trust_cert: true,
                },
                SourceConfig::Oracle {
                    username: "user".to_string(),
                    password: Some("password".to_string()),
                    dsn: "localhost/XE".to_string(),
                    query: "SELECT * FROM Customers".to_string(),
                },
            ],
            target: TargetConfig::default(),
        }
    }
}

/// One extract source
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Spreadsheet file (xlsx/xlsm/xls/ods) or CSV file
    Workbook {
        path: PathBuf,
        /// Sheet to read; the first sheet when omitted
        #[serde(default)]
        sheet: Option<String>,
    },
    /// Microsoft SQL Server
    SqlServer {
        server: String,
        #[serde(default = "default_sql_server_port")]
        port: u16,
        database: String,
        /// Integrated (trusted) authentication when omitted
        #[serde(default)]
        username: Option<String>,
        /// Falls back to `SHEETFLOW_SQLSERVER_PASSWORD`
        #[serde(default)]
        password: Option<String>,
        query: String,
        #[serde(default = "default_true")]
        trust_cert: bool,
    },
    /// Oracle via OCI
    Oracle {
        username: String,
        /// Falls back to `SHEETFLOW_ORACLE_PASSWORD`
        #[serde(default)]
        password: Option<String>,
        /// Connect string, e.g. `localhost/XE`
        dsn: String,
        query: String,
    },
    /// Any store reachable through a sqlx URL (sqlite, postgres, mysql)
    Sql { url: String, query: String },
}

/// Destination table for the combined rows
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    /// sqlx connection URL
    pub url: String,
    /// Table that gets dropped and recreated
    pub table: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://target.db?mode=rwc".to_string(),
            table: "target_table".to_string(),
        }
    }
}

fn default_sql_server_port() -> u16 {
    1433
}

fn default_true() -> bool {
    true
}
