//! Relational store for log entries

pub mod sqlite;

use crate::logs::query::LogQuery;
use crate::models::{LogEntry, LogRow};
use async_trait::async_trait;
use thiserror::Error;

pub use sqlite::SqliteLogStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to log store: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("failed to prepare log store schema: {0}")]
    Schema(#[source] sqlx::Error),
    #[error("failed to insert log entry: {0}")]
    Insert(#[source] sqlx::Error),
    #[error("failed to query log entries: {0}")]
    Query(#[source] sqlx::Error),
    #[error("failed to read log row: {0}")]
    Row(#[source] sqlx::Error),
}

/// Persistence for log entries.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait LogStore: Send + Sync + 'static {
    /// Insert one entry, returning the number of affected rows
    async fn insert(&self, entry: &LogEntry) -> Result<u64, StoreError>;

    /// Run a built select statement; rows come back in statement order
    async fn query(&self, query: &LogQuery) -> Result<Vec<LogRow>, StoreError>;

    /// Cheap liveness probe
    async fn ping(&self) -> Result<(), StoreError>;
}
