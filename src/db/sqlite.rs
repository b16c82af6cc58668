use crate::db::schema::init_statements;
use crate::error::PortfolioError;
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::query::Query;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info};

pub type SqlitePool = Pool<Sqlite>;

/// A bound statement parameter. Statements are never assembled from values.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Integer(i64),
    Text(String),
    Timestamp(NaiveDateTime),
    Null,
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Integer(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<NaiveDateTime> for SqlParam {
    fn from(v: NaiveDateTime) -> Self {
        SqlParam::Timestamp(v)
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlParam::Null)
    }
}

/// Outcome of a mutating statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    pub last_insert_id: i64,
    pub rows_affected: u64,
}

/// Diagnostic snapshot returned by [`PortfolioStore::health_check`].
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_connected(&self) -> bool {
        self.status == "connected"
    }
}

#[derive(Clone)]
pub struct PortfolioStore {
    pool: SqlitePool,
    location: String,
}

impl PortfolioStore {
    pub fn new(pool: SqlitePool, location: impl Into<String>) -> Self {
        Self {
            pool,
            location: location.into(),
        }
    }

    /// Open (creating if missing) the database behind `database_url`.
    pub async fn open(database_url: &str) -> Result<Self, PortfolioError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        // Each connection to `:memory:` is its own database, so pin a single one.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(8)
                .connect_with(options.journal_mode(SqliteJournalMode::Wal))
                .await?
        };

        info!(location = %database_url, "connected to SQLite database");
        Ok(Self::new(pool, database_url))
    }

    /// Initialize the schema by executing the bundled DDL in one transaction.
    pub async fn init_schema(&self) -> Result<(), PortfolioError> {
        let mut tx = self.pool.begin().await?;
        // sqlx::query runs a single statement, so feed them one at a time
        for stmt in init_statements() {
            sqlx::query(stmt).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        info!("database tables ready");
        Ok(())
    }

    /// Run one mutating statement as its own transaction.
    pub async fn execute(
        &self,
        statement: &str,
        params: &[SqlParam],
    ) -> Result<ExecOutcome, PortfolioError> {
        let wrap = |source: sqlx::Error| storage_error(statement, params, source);

        let mut tx = self.pool.begin().await.map_err(wrap)?;
        let result = bind_params(sqlx::query(statement), params)
            .execute(&mut *tx)
            .await
            .map_err(wrap)?;
        tx.commit().await.map_err(wrap)?;

        Ok(ExecOutcome {
            last_insert_id: result.last_insert_rowid(),
            rows_affected: result.rows_affected(),
        })
    }

    /// Zero or one row; absence is `Ok(None)`.
    pub async fn query_one(
        &self,
        statement: &str,
        params: &[SqlParam],
    ) -> Result<Option<SqliteRow>, PortfolioError> {
        bind_params(sqlx::query(statement), params)
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| storage_error(statement, params, source))
    }

    pub async fn query_all(
        &self,
        statement: &str,
        params: &[SqlParam],
    ) -> Result<Vec<SqliteRow>, PortfolioError> {
        bind_params(sqlx::query(statement), params)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| storage_error(statement, params, source))
    }

    /// `SELECT COUNT(*) AS count ...` helper; a missing row counts as zero.
    pub async fn count(&self, statement: &str, params: &[SqlParam]) -> Result<i64, PortfolioError> {
        match self.query_one(statement, params).await? {
            Some(row) => Ok(row.try_get("count")?),
            None => Ok(0),
        }
    }

    /// Probe connectivity. Never fails; errors are reported in the returned status.
    pub async fn health_check(&self) -> HealthReport {
        let timestamp = Utc::now().to_rfc3339();
        match self.probe().await {
            Ok((database_time, table_count)) => HealthReport {
                status: "connected",
                timestamp,
                database_time: Some(database_time),
                table_count: Some(table_count),
                location: Some(self.location.clone()),
                error: None,
            },
            Err(e) => HealthReport {
                status: "error",
                timestamp,
                database_time: None,
                table_count: None,
                location: None,
                error: Some(e.to_string()),
            },
        }
    }

    async fn probe(&self) -> Result<(String, i64), PortfolioError> {
        let now: (String,) = sqlx::query_as("SELECT datetime('now')")
            .fetch_one(&self.pool)
            .await?;
        let tables = self
            .count(
                "SELECT COUNT(*) AS count FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
                &[],
            )
            .await?;
        Ok((now.0, tables))
    }

    /// Release all connections. Safe to call more than once.
    pub async fn close(&self) {
        if self.pool.is_closed() {
            return;
        }
        self.pool.close().await;
        info!("database connection closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlParam],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for p in params {
        query = match p {
            SqlParam::Integer(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.as_str()),
            SqlParam::Timestamp(v) => query.bind(*v),
            SqlParam::Null => query.bind(None::<String>),
        };
    }
    query
}

fn storage_error(statement: &str, params: &[SqlParam], source: sqlx::Error) -> PortfolioError {
    error!(
        statement = %statement.trim(),
        params = ?params,
        error = %source,
        "database statement failed"
    );
    PortfolioError::Storage {
        statement: statement.trim().to_string(),
        params: params.to_vec(),
        source,
    }
}
