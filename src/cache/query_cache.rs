//! Query Cache Module
//!
//! Shared, expiring memo table in front of the record store.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::stats::CacheCounters;
use crate::cache::{CacheEntry, CacheStats, QueryKey};
use crate::error::StoreError;
use crate::models::City;

// == Query Cache ==
/// Expiring cache of ranked lookups.
///
/// Cloning is cheap and every clone shares the same table. Lookups take the
/// read lock; inserts and removals take the write lock, so a reader only ever
/// sees whole entries. No lock is held while the fill function runs, which
/// means concurrent misses on the same key may each call the store.
#[derive(Debug, Clone)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<QueryKey, CacheEntry>>>,
    counters: Arc<CacheCounters>,
    ttl: Duration,
}

impl QueryCache {
    // == Constructor ==
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            counters: Arc::new(CacheCounters::default()),
            ttl,
        }
    }

    /// Default lifetime of new entries.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Get Or Compute ==
    /// Returns the cached results for `key`, calling `fill` on a miss.
    ///
    /// Uses the cache's default TTL. See [`QueryCache::get_or_compute_with_ttl`].
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: QueryKey,
        fill: F,
    ) -> Result<Arc<Vec<City>>, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<City>, StoreError>>,
    {
        self.get_or_compute_with_ttl(key, self.ttl, fill).await
    }

    /// Returns the cached results for `key`, calling `fill` on a miss.
    ///
    /// A successful fill is stored with expiry `now + ttl`, replacing any
    /// previous entry. A failed fill is returned as-is and never cached; an
    /// expired entry left under the key is dropped at that point.
    pub async fn get_or_compute_with_ttl<F, Fut>(
        &self,
        key: QueryKey,
        ttl: Duration,
        fill: F,
    ) -> Result<Arc<Vec<City>>, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<City>, StoreError>>,
    {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&key) {
                if !entry.is_expired() {
                    self.counters.record_hit();
                    debug!("Cache HIT for query={:?} limit={}", key.query, key.limit);
                    return Ok(Arc::clone(&entry.results));
                }
            }
        }

        self.counters.record_miss();
        debug!("Cache MISS for query={:?} limit={}", key.query, key.limit);

        match fill().await {
            Ok(results) => {
                let entry = CacheEntry::new(results, ttl);
                let results = Arc::clone(&entry.results);
                self.entries.write().await.insert(key, entry);
                Ok(results)
            }
            Err(err) => {
                self.counters.record_fill_failure();
                self.remove_if_expired(&key).await;
                Err(err)
            }
        }
    }

    async fn remove_if_expired(&self, key: &QueryKey) {
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(CacheEntry::is_expired) {
            entries.remove(key);
            self.counters.record_expired(1);
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();
        self.counters.record_expired(removed);
        removed
    }

    // == Length ==
    /// Returns the current number of entries, including expired ones not yet reaped.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let total_entries = self.len().await;
        self.counters.snapshot(total_entries)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(crate::cache::DEFAULT_TTL)
    }
}
