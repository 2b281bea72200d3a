//! City Autocomplete - city-name suggestions over HTTP
//!
//! Ranks cities by prefix match and search popularity, memoizing lookups in
//! an expiring in-memory cache in front of the record store.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod ranking;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::{spawn_cleanup_task, spawn_popularity_workers};
