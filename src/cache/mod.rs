//! Cache Module
//!
//! Memoizes ranked lookups per (query, limit) for a fixed TTL. Expired
//! entries are dropped lazily on lookup and eagerly by the reaper task.

mod entry;
mod query_cache;
mod stats;


// Re-export public types
pub use entry::{CacheEntry, QueryKey};
pub use query_cache::QueryCache;
pub use stats::CacheStats;

// == Public Constants ==
/// Lifetime of a cached lookup when none is configured
pub const DEFAULT_TTL: std::time::Duration = std::time::Duration::from_secs(5 * 60);
