//! Replace a table in a relational store with the rows of a dataset
//!
//! The drop, create and inserts run in one transaction. Whether the drop and
//! create are rolled back with it on failure depends on the store: SQLite and
//! Postgres have transactional DDL, MySQL commits DDL implicitly.

use sqlx::any::{Any, AnyArguments};
use sqlx::query::Query;
use sqlx::{AnyConnection, Connection};

use crate::error::{EtlError, EtlResult};
use crate::extract::redact_url;
use crate::extract::sql::connect;
use crate::table::{Dataset, Value};

/// Column type chosen for the recreated table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Double,
    Boolean,
    Text,
}

impl ColumnType {
    fn sql(self) -> &'static str {
        match self {
            ColumnType::BigInt => "BIGINT",
            ColumnType::Double => "DOUBLE PRECISION",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Text => "TEXT",
        }
    }
}

/// SQL dialect details that differ between the compiled-in backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    fn from_backend(name: &str) -> Self {
        match name {
            "PostgreSQL" => Dialect::Postgres,
            "MySQL" => Dialect::MySql,
            _ => Dialect::Sqlite,
        }
    }

    fn quote(self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident.replace('`', "``")),
            _ => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    fn placeholder(self, n: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", n),
            _ => "?".to_string(),
        }
    }
}

/// Pick one column type per column from the values it holds.
///
/// Integers only -> BIGINT; any float among numbers -> DOUBLE; booleans only
/// -> BOOLEAN; everything else (text, dates, mixtures) -> TEXT. A column with
/// nothing but nulls is TEXT.
pub fn infer_column_types(dataset: &Dataset) -> Vec<ColumnType> {
    (0..dataset.columns().len())
        .map(|idx| {
            let mut inferred: Option<ColumnType> = None;
            for row in dataset.rows() {
                let ty = match &row[idx] {
                    Value::Null => continue,
                    Value::Int(_) => ColumnType::BigInt,
                    Value::Float(_) => ColumnType::Double,
                    Value::Bool(_) => ColumnType::Boolean,
                    Value::Text(_) | Value::DateTime(_) => ColumnType::Text,
                };
                inferred = Some(match (inferred, ty) {
                    (None, ty) => ty,
                    (Some(a), b) if a == b => a,
                    (Some(ColumnType::BigInt), ColumnType::Double)
                    | (Some(ColumnType::Double), ColumnType::BigInt) => ColumnType::Double,
                    _ => ColumnType::Text,
                });
                if inferred == Some(ColumnType::Text) {
                    break;
                }
            }
            inferred.unwrap_or(ColumnType::Text)
        })
        .collect()
}

/// Drop `table` if it exists, recreate it from the dataset's columns and
/// insert every row. Returns the number of rows written.
pub async fn replace_table(url: &str, table: &str, dataset: &Dataset) -> EtlResult<u64> {
    let sink_name = format!("{} table '{}'", redact_url(url), table);
    let sink = |e: sqlx::Error| EtlError::sink_unavailable(&sink_name, e);

    if dataset.columns().is_empty() {
        return Err(EtlError::sink_unavailable(
            &sink_name,
            "dataset has no columns to create the table from",
        ));
    }

    let mut conn = connect(url).await.map_err(sink)?;
    let result = write_table(&mut conn, table, dataset).await;

    if let Err(e) = conn.close().await {
        log::warn!("Failed to close connection to {}: {}", redact_url(url), e);
    }

    let written = result.map_err(sink)?;
    log::info!("Replaced {} with {} rows", sink_name, written);
    Ok(written)
}

async fn write_table(conn: &mut AnyConnection, table: &str, dataset: &Dataset) -> Result<u64, sqlx::Error> {
    let dialect = Dialect::from_backend(conn.backend_name());
    let types = infer_column_types(dataset);
    let table_ident = dialect.quote(table);

    let column_defs: Vec<String> = dataset
        .columns()
        .iter()
        .zip(&types)
        .map(|(name, ty)| format!("{} {}", dialect.quote(name), ty.sql()))
        .collect();
    let column_list: Vec<String> = dataset.columns().iter().map(|c| dialect.quote(c)).collect();
    let placeholders: Vec<String> = (1..=types.len()).map(|n| dialect.placeholder(n)).collect();

    let drop_sql = format!("DROP TABLE IF EXISTS {}", table_ident);
    let create_sql = format!("CREATE TABLE {} ({})", table_ident, column_defs.join(", "));
    let insert_sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table_ident,
        column_list.join(", "),
        placeholders.join(", ")
    );

    let mut tx = conn.begin().await?;
    sqlx::query(&drop_sql).execute(&mut *tx).await?;
    sqlx::query(&create_sql).execute(&mut *tx).await?;

    let mut written = 0;
    for row in dataset.rows() {
        let mut query = sqlx::query(&insert_sql);
        for (value, ty) in row.iter().zip(&types) {
            query = bind_value(query, value, *ty);
        }
        written += query.execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;
    Ok(written)
}

fn bind_value<'q>(
    query: Query<'q, Any, AnyArguments<'q>>,
    value: &Value,
    ty: ColumnType,
) -> Query<'q, Any, AnyArguments<'q>> {
    match (ty, value) {
        (ColumnType::BigInt, Value::Int(i)) => query.bind(*i),
        (ColumnType::BigInt, _) => query.bind(None::<i64>),
        (ColumnType::Double, v) => query.bind(v.as_float()),
        (ColumnType::Boolean, v) => query.bind(v.as_bool()),
        (ColumnType::Text, Value::Null) => query.bind(None::<String>),
        (ColumnType::Text, Value::DateTime(dt)) => {
            query.bind(dt.format("%Y-%m-%d %H:%M:%S").to_string())
        }
        (ColumnType::Text, v) => query.bind(v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{SqlSource, Source};
    use chrono::NaiveDate;

    fn sqlite_url(dir: &tempfile::TempDir) -> String {
        format!("sqlite://{}?mode=rwc", dir.path().join("target.db").display())
    }

    #[test]
    fn test_infer_column_types() {
        let ds = Dataset::from_rows(
            ["id", "amount", "flag", "mixed", "empty", "when"],
            vec![
                vec![
                    Value::Int(1),
                    Value::Int(3),
                    Value::Bool(true),
                    Value::Int(1),
                    Value::Null,
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().into(),
                ],
                vec![
                    Value::Null,
                    Value::Float(2.5),
                    Value::Null,
                    "x".into(),
                    Value::Null,
                    Value::Null,
                ],
            ],
        );

        assert_eq!(
            infer_column_types(&ds),
            vec![
                ColumnType::BigInt,
                ColumnType::Double,
                ColumnType::Boolean,
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Text,
            ]
        );
    }

    #[test]
    fn test_dialects() {
        assert_eq!(Dialect::from_backend("PostgreSQL").placeholder(2), "$2");
        assert_eq!(Dialect::from_backend("SQLite").placeholder(2), "?");
        assert_eq!(Dialect::MySql.quote("a`b"), "`a``b`");
        assert_eq!(Dialect::Sqlite.quote("Total \"Revenue\""), "\"Total \"\"Revenue\"\"\"");
    }

    #[tokio::test]
    async fn test_replace_table_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let url = sqlite_url(&dir);

        let ds = Dataset::from_rows(
            ["id", "name", "salary", "start"],
            vec![
                vec![
                    Value::Int(1),
                    "Ada".into(),
                    Value::Float(5200.5),
                    NaiveDate::from_ymd_opt(2020, 2, 1).unwrap().into(),
                ],
                vec![Value::Int(2), Value::Null, Value::Int(4000), Value::Null],
            ],
        );

        assert_eq!(replace_table(&url, "target_table", &ds).await.unwrap(), 2);

        let back = SqlSource::new(url.clone(), "SELECT * FROM target_table ORDER BY id".into())
            .extract()
            .await
            .unwrap();
        assert_eq!(back.columns(), ds.columns());
        assert_eq!(back.get(0, "name"), Some(&Value::Text("Ada".into())));
        assert_eq!(back.get(1, "salary"), Some(&Value::Float(4000.0)));
        assert_eq!(back.get(0, "start"), Some(&Value::Text("2020-02-01 00:00:00".into())));
        assert_eq!(back.get(1, "name"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_replace_drops_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let url = sqlite_url(&dir);

        let first = Dataset::from_rows(["a", "b"], vec![vec![Value::Int(1), Value::Int(2)]; 3]);
        replace_table(&url, "target_table", &first).await.unwrap();

        let second = Dataset::from_rows(["c"], vec![vec!["only".into()]]);
        replace_table(&url, "target_table", &second).await.unwrap();

        let back = SqlSource::new(url, "SELECT * FROM target_table".into())
            .extract()
            .await
            .unwrap();
        assert_eq!(back, second);
    }

    #[tokio::test]
    async fn test_unreachable_target_is_sink_error() {
        let err = replace_table(
            "sqlite:///nonexistent/dir/target.db",
            "target_table",
            &Dataset::new(["a"]),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "SinkUnavailable");
    }
}
