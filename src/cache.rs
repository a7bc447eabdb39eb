//! TTL Cache
//!
//! Moka-backed cache with hit/miss accounting, shared by the content store
//! (parsed markdown items) and the GitHub catalog (fetched repository data).

use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cache statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate_percent: f64,
}

/// Time-bounded cache keyed by string
#[derive(Clone)]
pub struct TtlCache<V: Clone + Send + Sync + 'static> {
    name: &'static str,
    cache: Cache<String, V>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl<V: Clone + Send + Sync + 'static> TtlCache<V> {
    /// Create new cache with TTL
    pub fn new(name: &'static str, max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self {
            name,
            cache,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get cached value
    pub async fn get(&self, key: &str) -> Option<V> {
        if let Some(value) = self.cache.get(key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(cache = self.name, key, "cache hit");
            Some(value)
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(cache = self.name, key, "cache miss");
            None
        }
    }

    /// Store value
    pub async fn set(&self, key: &str, value: V) {
        self.cache.insert(key.to_string(), value).await;
    }

    /// Clear all entries
    pub fn clear(&self) {
        self.cache.invalidate_all();
        debug!(cache = self.name, "cache cleared");
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        CacheStats {
            entries: self.cache.entry_count(),
            hits,
            misses,
            hit_rate_percent: if total > 0 {
                (hits as f64 / total as f64) * 100.0
            } else {
                0.0
            },
        }
    }
}
