//! Cache table in a SQLite database
//!
//! Lets several service instances share cached results through one file.

use super::{CacheError, ResponseCache};
use crate::store::sqlite::connect_pool;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use std::time::Duration;

const CACHE_POOL_CONNECTIONS: u32 = 5;

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub struct SqliteCache {
    pool: SqlitePool,
}

impl SqliteCache {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let pool = connect_pool(url, CACHE_POOL_CONNECTIONS).await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, CacheError> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS cache_entries (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                expires_at INTEGER NOT NULL
            )"#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl ResponseCache for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let value: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT value FROM cache_entries WHERE key = ?1 AND expires_at > ?2")
                .bind(key)
                .bind(now_millis())
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now_millis().saturating_add(ttl_millis);

        sqlx::query(
            "INSERT INTO cache_entries (key, value, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at",
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE expires_at <= ?1")
            .bind(now_millis())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
