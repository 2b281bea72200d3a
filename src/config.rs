//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Which record store backs the autocomplete lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Persistent SQLite database, seeded from the CSV file when empty
    #[default]
    Sqlite,
    /// Whole data set held in memory and scanned linearly
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// SQLite database file
    pub db_path: PathBuf,
    /// City data file used to seed the store
    pub csv_path: PathBuf,
    /// Record store implementation
    pub store_backend: StoreBackend,
    /// Lifetime of a cached query result in seconds
    pub cache_ttl: u64,
    /// Reaper interval in seconds
    pub cleanup_interval: u64,
    /// Number of popularity worker tasks
    pub popularity_workers: usize,
    /// Pending popularity jobs before new ones are dropped
    pub popularity_queue_capacity: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 8080)
    /// - `DB_PATH` - SQLite database path (default: cities.db)
    /// - `CSV_PATH` - City data file (default: world-cities.csv)
    /// - `STORE_BACKEND` - `sqlite` or `memory` (default: sqlite)
    /// - `CACHE_TTL` - Query cache TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Reaper frequency in seconds (default: 60)
    /// - `POPULARITY_WORKERS` - Popularity worker count (default: 4)
    /// - `POPULARITY_QUEUE_CAPACITY` - Popularity queue size (default: 1024)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_env("PORT").unwrap_or(defaults.server_port),
            db_path: env::var("DB_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            csv_path: env::var("CSV_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.csv_path),
            store_backend: parse_env("STORE_BACKEND").unwrap_or(defaults.store_backend),
            cache_ttl: parse_env("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            cleanup_interval: parse_env("CLEANUP_INTERVAL")
                .filter(|v| *v > 0)
                .unwrap_or(defaults.cleanup_interval),
            popularity_workers: parse_env("POPULARITY_WORKERS")
                .filter(|v| *v > 0)
                .unwrap_or(defaults.popularity_workers),
            popularity_queue_capacity: parse_env("POPULARITY_QUEUE_CAPACITY")
                .filter(|v| *v > 0)
                .unwrap_or(defaults.popularity_queue_capacity),
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            db_path: PathBuf::from("cities.db"),
            csv_path: PathBuf::from("world-cities.csv"),
            store_backend: StoreBackend::Sqlite,
            cache_ttl: 300,
            cleanup_interval: 60,
            popularity_workers: 4,
            popularity_queue_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.db_path, PathBuf::from("cities.db"));
        assert_eq!(config.csv_path, PathBuf::from("world-cities.csv"));
        assert_eq!(config.store_backend, StoreBackend::Sqlite);
        assert_eq!(config.cache_ttl, 300);
        assert_eq!(config.cleanup_interval, 60);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for name in [
            "PORT",
            "DB_PATH",
            "CSV_PATH",
            "STORE_BACKEND",
            "CACHE_TTL",
            "CLEANUP_INTERVAL",
            "POPULARITY_WORKERS",
            "POPULARITY_QUEUE_CAPACITY",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.store_backend, StoreBackend::Sqlite);
        assert_eq!(config.cache_ttl, 300);
        assert_eq!(config.cleanup_interval, 60);
        assert_eq!(config.popularity_workers, 4);
        assert_eq!(config.popularity_queue_capacity, 1024);
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert_eq!(" SQLite ".parse::<StoreBackend>(), Ok(StoreBackend::Sqlite));
        assert!("postgres".parse::<StoreBackend>().is_err());
    }
}
