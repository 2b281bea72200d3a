//! Cache Entry Module
//!
//! Defines the cache key and the immutable, time-limited cached result.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::models::City;

// == Query Key ==
/// Identifies one cached lookup.
///
/// The query is kept exactly as the client sent it, so "Ber" and "ber" are
/// cached separately even though they rank identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    /// Raw query text
    pub query: String,
    /// Clamped result limit
    pub limit: usize,
}

impl QueryKey {
    /// Creates a new QueryKey
    pub fn new(query: impl Into<String>, limit: usize) -> Self {
        Self {
            query: query.into(),
            limit,
        }
    }
}

// == Cache Entry ==
/// A ranked result list and the instant it stops being served.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Ranked results, shared with every reader
    pub results: Arc<Vec<City>>,
    /// First instant at which the entry is no longer valid
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry that expires `ttl` from now.
    pub fn new(results: Vec<City>, ttl: Duration) -> Self {
        Self {
            results: Arc::new(results),
            expires_at: Instant::now() + ttl,
        }
    }

    // == Is Expired ==
    /// An entry is valid strictly before `expires_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Expiry check against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
