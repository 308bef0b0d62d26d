//! Ingestion and retrieval pipelines
//!
//! ```text
//! GET:  cache key -> cache lookup -> (miss) build query -> store -> rows
//!       -> JSON array -> cache write (best effort) -> response
//! POST: decode body -> stamp created_at -> store insert -> response
//! ```

use super::cache_key::derive_cache_key;
use super::query::{build_log_query, LogFilter, ValidationError};
use crate::cache::ResponseCache;
use crate::error::AppError;
use crate::metrics;
use crate::models::{LogEntry, NewLogEntry};
use crate::store::{LogStore, StoreError};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Lifetime of a cached query result
pub const CACHE_TTL: Duration = Duration::from_secs(3600);

/// Where a retrieval result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Cache,
    Store,
}

/// Serialized JSON array of log entries
#[derive(Debug, Clone)]
pub struct Retrieved {
    pub body: Vec<u8>,
    pub source: ResultSource,
}

/// Log pipelines over an injected store and cache
#[derive(Clone)]
pub struct LogService {
    store: Arc<dyn LogStore>,
    cache: Arc<dyn ResponseCache>,
    cache_ttl: Duration,
}

impl LogService {
    pub fn new(store: Arc<dyn LogStore>, cache: Arc<dyn ResponseCache>) -> Self {
        Self {
            store,
            cache,
            cache_ttl: CACHE_TTL,
        }
    }

    /// Override the cache lifetime (tests use short TTLs)
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn store(&self) -> &Arc<dyn LogStore> {
        &self.store
    }

    /// Decode, stamp and persist one entry
    pub async fn ingest(&self, body: &[u8]) -> Result<LogEntry, AppError> {
        let new_entry: NewLogEntry = serde_json::from_slice(body).map_err(|e| {
            error!(error = %e, "Failed to parse request body");
            metrics::record_ingest("invalid_body");
            ValidationError::Body(e.to_string())
        })?;

        let entry = new_entry.stamp(Utc::now());

        if let Err(e) = self.store.insert(&entry).await {
            error!(error = %e, "Failed to insert log entry");
            metrics::record_ingest("store_error");
            return Err(AppError::Insert(e));
        }

        metrics::record_ingest("created");
        Ok(entry)
    }

    /// Serve a filtered log query, through the cache.
    ///
    /// `path_and_query` is the request target exactly as received and only
    /// feeds the cache key; filtering is driven by `filter`.
    pub async fn retrieve(&self, path_and_query: &str, filter: &LogFilter) -> Result<Retrieved, AppError> {
        let cache_key = derive_cache_key(path_and_query);

        match self.cache.get(&cache_key).await {
            Ok(Some(body)) => {
                debug!(key = %cache_key, "Cache hit, returning cached logs");
                metrics::record_cache_lookup("hit");
                metrics::record_query("cache_hit");
                return Ok(Retrieved {
                    body,
                    source: ResultSource::Cache,
                });
            }
            Ok(None) => {
                debug!(key = %cache_key, "Cache miss");
                metrics::record_cache_lookup("miss");
            }
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Cache lookup failed, treating as miss");
                metrics::record_cache_lookup("error");
            }
        }

        let query = build_log_query(filter, Utc::now()).inspect_err(|_| {
            metrics::record_query("invalid_filter");
        })?;

        let started = Instant::now();
        let rows = self.store.query(&query).await;
        metrics::record_store_duration(started.elapsed());

        let rows = match rows {
            Ok(rows) => rows,
            Err(e @ StoreError::Row(_)) => {
                error!(error = %e, "Failed to scan row");
                metrics::record_query("store_error");
                return Err(AppError::ReadRows(Box::new(e)));
            }
            Err(e) => {
                error!(error = %e, "Failed to query logs");
                metrics::record_query("store_error");
                return Err(AppError::Query(e));
            }
        };

        let entries = rows
            .into_iter()
            .map(LogEntry::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                error!(error = %e, "Failed to decode stored timestamp");
                metrics::record_query("store_error");
                AppError::ReadRows(Box::new(e))
            })?;

        let body = serde_json::to_vec(&entries).map_err(|e| {
            error!(error = %e, "Failed to marshal logs to JSON");
            metrics::record_query("encode_error");
            AppError::Encode(e)
        })?;

        if let Err(e) = self.cache.set(&cache_key, &body, self.cache_ttl).await {
            warn!(key = %cache_key, error = %e, "Failed to cache query result");
        }

        metrics::record_query("store");
        Ok(Retrieved {
            body,
            source: ResultSource::Store,
        })
    }
}
