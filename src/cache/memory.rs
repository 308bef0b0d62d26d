use super::{CacheError, ResponseCache};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CachedValue {
    bytes: Arc<[u8]>,
    expires_at: Instant,
}

/// Entry cap used by [`MemoryCache::new`]
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// In-process cache (DashMap for low lock contention)
///
/// Holds at most `max_entries` keys. Inserting a new key into a full cache
/// drops expired entries first, then the entry closest to expiry.
#[derive(Debug)]
pub struct MemoryCache {
    entries: DashMap<String, CachedValue>,
    max_entries: usize,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Make room for one more key
    fn evict_for_insert(&self, now: Instant) {
        self.entries.retain(|_key, entry| entry.expires_at > now);
        if self.entries.len() < self.max_entries {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().expires_at)
            .map(|entry| entry.key().clone());
        // Iterator guards are gone before removal
        if let Some(key) = oldest {
            self.entries.remove(&key);
            tracing::debug!(key = %key, "Query cache full, evicted entry");
        }
    }

    /// Number of stored entries, expired ones included until purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();
        let hit = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.bytes.to_vec())),
            Some(_) => true,
            None => false,
        };

        // Guard is released above; removing while holding it would deadlock the shard
        if hit {
            self.entries
                .remove_if(key, |_, entry| entry.expires_at <= now);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.evict_for_insert(now);
        }

        self.entries.insert(
            key.to_string(),
            CachedValue {
                bytes: Arc::from(value),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, CacheError> {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_key, entry| entry.expires_at > now);
        Ok(before.saturating_sub(self.entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_miss() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new();
        cache.set("k", b"[1,2]", Duration::from_secs(3600)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"[1,2]".to_vec()));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = MemoryCache::new();
        cache.set("k", b"old", Duration::from_secs(60)).await.unwrap();
        cache.set("k", b"new", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"new".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss_and_removed() {
        let cache = MemoryCache::new();
        cache.set("k", b"v", Duration::from_millis(5)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_live_entries() {
        let cache = MemoryCache::new();
        cache.set("short", b"a", Duration::from_millis(5)).await.unwrap();
        cache.set("long", b"b", Duration::from_secs(3600)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(cache.purge_expired().await.unwrap(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("long").await.unwrap(), Some(b"b".to_vec()));
    }

    #[tokio::test]
    async fn test_full_cache_evicts_soonest_expiry() {
        let cache = MemoryCache::with_max_entries(2);
        cache.set("logs:/api/logs?x=1", b"a", Duration::from_secs(60)).await.unwrap();
        cache.set("logs:/api/logs?x=2", b"b", Duration::from_secs(3600)).await.unwrap();
        cache.set("logs:/api/logs?x=3", b"c", Duration::from_secs(3600)).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("logs:/api/logs?x=1").await.unwrap(), None);
        assert_eq!(cache.get("logs:/api/logs?x=2").await.unwrap(), Some(b"b".to_vec()));
        assert_eq!(cache.get("logs:/api/logs?x=3").await.unwrap(), Some(b"c".to_vec()));
    }

    #[tokio::test]
    async fn test_full_cache_prefers_dropping_expired() {
        let cache = MemoryCache::with_max_entries(2);
        cache.set("stale", b"a", Duration::from_millis(5)).await.unwrap();
        cache.set("live", b"b", Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        cache.set("new", b"c", Duration::from_secs(3600)).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("live").await.unwrap(), Some(b"b".to_vec()));
        assert_eq!(cache.get("new").await.unwrap(), Some(b"c".to_vec()));
    }

    #[tokio::test]
    async fn test_overwrite_in_full_cache_keeps_others() {
        let cache = MemoryCache::with_max_entries(2);
        cache.set("a", b"1", Duration::from_secs(60)).await.unwrap();
        cache.set("b", b"2", Duration::from_secs(60)).await.unwrap();
        cache.set("a", b"3", Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b").await.unwrap(), Some(b"2".to_vec()));
    }
}
