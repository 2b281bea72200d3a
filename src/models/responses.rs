//! Response DTOs for the autocomplete API
//!
//! Autocomplete results are serialized straight from [`City`](super::City);
//! the types here cover the operational endpoints.

use std::time::Duration;

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to call the store
    pub misses: u64,
    /// Store lookups that failed and were not cached
    pub fill_failures: u64,
    /// Entries dropped because their TTL elapsed
    pub expired_removed: u64,
    /// Current number of cached queries
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Lifetime given to new entries, in seconds
    pub ttl_seconds: u64,
}

impl StatsResponse {
    /// Builds the response from a stats snapshot and the cache's entry TTL.
    pub fn new(stats: CacheStats, ttl: Duration) -> Self {
        Self {
            ttl_seconds: ttl.as_secs(),
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            fill_failures: stats.fill_failures,
            expired_removed: stats.expired_removed,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Number of cities the store holds
    pub cities: usize,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(cities: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            cities,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
