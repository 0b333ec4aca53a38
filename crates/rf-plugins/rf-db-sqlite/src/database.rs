//! Explicitly owned SQLite handle.
//!
//! The binary builds one [`Database`] at startup, hands clones of its pool to
//! the repositories and closes it on shutdown. There is no global pool.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use rf_config::DatabaseSettings;
use rf_core::error::Result;
use serde_json::{Map, Number, Value};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};

/// Outcome of [`Database::query`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// One JSON object per row, keyed by column name.
    pub rows: Vec<Value>,
    /// Rows returned for reads, rows affected for writes.
    pub row_count: u64,
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&settings.url)
            .with_context(|| format!("invalid database url {:?}", settings.url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(5));
        // Every connection to `:memory:` is its own database, so keep exactly one alive.
        pool_options = if is_memory(&settings.url) {
            pool_options.max_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.max_connections(settings.max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .context("failed to open SQLite pool")?;

        log::info!("connected to {}", settings.url);
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to run migrations")?;
        Ok(())
    }

    /// Connectivity check.
    pub async fn authenticate(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("database did not answer")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
        log::info!("database pool closed");
    }

    /// Runs raw SQL with positional `?` parameters.
    ///
    /// `SELECT`/`WITH` statements and statements with a `RETURNING` clause
    /// yield their rows; anything else yields no rows and the number of rows
    /// affected.
    pub async fn query(&self, text: &str, values: &[Value]) -> Result<QueryResult> {
        let query = values
            .iter()
            .fold(sqlx::query(text), |query, value| bind_json(query, value));

        if returns_rows(text) {
            let rows = query
                .fetch_all(&self.pool)
                .await
                .with_context(|| format!("query failed: {text}"))?
                .iter()
                .map(row_to_json)
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("could not decode row")?;
            Ok(QueryResult { row_count: rows.len() as u64, rows })
        } else {
            let done = query
                .execute(&self.pool)
                .await
                .with_context(|| format!("statement failed: {text}"))?;
            Ok(QueryResult { rows: Vec::new(), row_count: done.rows_affected() })
        }
    }
}

fn is_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn returns_rows(text: &str) -> bool {
    let upper = text.trim_start().to_ascii_uppercase();
    upper.starts_with("SELECT") || upper.starts_with("WITH") || upper.contains("RETURNING")
}

fn bind_json<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.to_string()),
    }
}

fn row_to_json(row: &SqliteRow) -> std::result::Result<Value, sqlx::Error> {
    let mut object = Map::new();
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            object.insert(column.name().to_string(), Value::Null);
            continue;
        }

        // Expression columns have no declared type; fall back to the storage class.
        let declared = column.type_info();
        let type_name = if declared.is_null() {
            raw.type_info().name().to_string()
        } else {
            declared.name().to_string()
        };

        let value = match type_name.as_str() {
            "BOOLEAN" => Value::Bool(row.try_get_unchecked::<bool, _>(index)?),
            "INTEGER" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
            "REAL" | "NUMERIC" => Number::from_f64(row.try_get_unchecked::<f64, _>(index)?)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            "BLOB" => Value::String(
                String::from_utf8_lossy(&row.try_get_unchecked::<Vec<u8>, _>(index)?).into_owned(),
            ),
            _ => Value::String(row.try_get_unchecked::<String, _>(index)?),
        };
        object.insert(column.name().to_string(), value);
    }
    Ok(Value::Object(object))
}
