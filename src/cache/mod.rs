//! Key-value cache for serialized query results
//!
//! Entries expire after the TTL given at write time. Nothing is invalidated
//! on write; readers may see results up to one TTL old.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time;

pub use memory::{MemoryCache, DEFAULT_MAX_ENTRIES};
pub use sqlite::SqliteCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("unsupported cache url: {0}")]
    UnsupportedUrl(String),
    #[error("cache backend error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Get/set-with-expiry cache, shared by all request tasks
#[async_trait]
pub trait ResponseCache: Send + Sync + 'static {
    /// Cached bytes for `key`, or `None` on a miss or expired entry
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key` for `ttl`, replacing any previous value
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    /// Drop expired entries, returning how many were removed
    async fn purge_expired(&self) -> Result<u64, CacheError>;
}

/// Open the cache backend named by `url`.
///
/// `memory://` selects the in-process cache, capped at `max_entries` keys;
/// any `sqlite:` URL selects a cache table in that database.
pub async fn connect(url: &str, max_entries: usize) -> Result<Arc<dyn ResponseCache>, CacheError> {
    if url == "memory" || url.starts_with("memory://") {
        return Ok(Arc::new(MemoryCache::with_max_entries(max_entries)));
    }
    if url.starts_with("sqlite:") {
        return Ok(Arc::new(SqliteCache::connect(url).await?));
    }
    Err(CacheError::UnsupportedUrl(url.to_string()))
}

/// Whether [`connect`] understands `url`
pub fn is_supported_url(url: &str) -> bool {
    url == "memory" || url.starts_with("memory://") || url.starts_with("sqlite:")
}

/// Spawn the background task that purges expired entries
pub fn spawn_sweeper(cache: Arc<dyn ResponseCache>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        sweep_loop(cache, every).await;
    })
}

async fn sweep_loop(cache: Arc<dyn ResponseCache>, every: Duration) {
    let mut interval = time::interval(every);
    // The first tick fires immediately; nothing can have expired yet.
    interval.tick().await;

    loop {
        interval.tick().await;

        match cache.purge_expired().await {
            Ok(purged) => {
                tracing::debug!(purged = purged, "Cache sweep completed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cache sweep failed");
            }
        }
    }
}
