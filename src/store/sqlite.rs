//! SQLite-backed log store
//!
//! - Connection pooling (one connection borrowed per statement)
//! - WAL mode for concurrent reads/writes on file databases
//! - Table bootstrap with `CREATE TABLE IF NOT EXISTS`

use super::{LogStore, StoreError};
use crate::logs::query::{BindValue, LogQuery};
use crate::models::{LogEntry, LogRow};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;

/// True when the URL names a private in-memory database.
///
/// Every pooled connection to such a database would see its own empty
/// copy, so these pools are pinned to a single long-lived connection.
fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Open a SQLite pool for `url`
pub(crate) async fn connect_pool(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = is_in_memory(url);

    let mut options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(30))
        .pragma("synchronous", "NORMAL");
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(max_connections)
    };

    pool_options
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await
}

/// Log store handle over a SQLite pool
#[derive(Clone)]
pub struct SqliteLogStore {
    pool: SqlitePool,
}

impl SqliteLogStore {
    /// Connect and make sure the `logs` table exists
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = SqliteLogStore::connect("sqlite://logvault.db", 5).await?;
    /// ```
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = connect_pool(database_url, max_connections)
            .await
            .map_err(StoreError::Connect)?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, bootstrapping the schema
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        Self::ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    async fn ensure_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                log_message TEXT NOT NULL,
                log_level TEXT NOT NULL,
                created_at TEXT NOT NULL
            )"#,
        )
        .execute(pool)
        .await
        .map_err(StoreError::Schema)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_logs_created_at ON logs (created_at)")
            .execute(pool)
            .await
            .map_err(StoreError::Schema)?;

        tracing::debug!("Log store schema ready");
        Ok(())
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl LogStore for SqliteLogStore {
    async fn insert(&self, entry: &LogEntry) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO logs (log_message, log_level, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(&entry.message)
        .bind(&entry.level)
        .bind(&entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::Insert)?;

        Ok(result.rows_affected())
    }

    async fn query(&self, query: &LogQuery) -> Result<Vec<LogRow>, StoreError> {
        let mut statement = sqlx::query(&query.sql);
        for param in &query.params {
            statement = match param {
                BindValue::Text(value) => statement.bind(value.as_str()),
                BindValue::Integer(value) => statement.bind(*value),
            };
        }

        let rows = statement
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::Query)?;

        rows.into_iter()
            .map(|row| {
                Ok(LogRow {
                    message: row.try_get("log_message").map_err(StoreError::Row)?,
                    level: row.try_get("log_level").map_err(StoreError::Row)?,
                    created_at: row.try_get("created_at").map_err(StoreError::Row)?,
                })
            })
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StoreError::Query)?;
        Ok(())
    }
}
