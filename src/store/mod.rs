//! Record Store Module
//!
//! City records and their popularity counters live behind [`CityStore`].
//! Two interchangeable backends exist: a persistent SQLite database and a
//! full in-memory linear scan.

mod loader;
mod memory;
mod sqlite;

use std::sync::Arc;

use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::error::StoreError;
use crate::models::City;

pub use loader::{load_cities, read_cities};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

// == City Store Trait ==
/// Synchronous access to city records and popularity counters.
///
/// Implementations block the calling thread; async callers go through
/// `tokio::task::spawn_blocking`.
pub trait CityStore: Send + Sync {
    /// Returns up to `limit` cities matching `query`, ranked prefix-first,
    /// then by popularity, then by name.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<City>, StoreError>;

    /// Records one more search hit for the city.
    fn increment_popularity(&self, geonameid: &str) -> Result<(), StoreError>;

    /// Current search count for the city; `0` when never searched.
    fn popularity(&self, geonameid: &str) -> Result<u64, StoreError>;

    /// Number of city records held.
    fn count(&self) -> Result<usize, StoreError>;
}

// == Open Store ==
/// Builds the configured backend and makes sure it holds data.
///
/// The SQLite backend seeds itself from `csv_path` only when its cities table
/// is empty; the memory backend always loads the file.
pub fn open_store(config: &Config) -> Result<Arc<dyn CityStore>, StoreError> {
    let store: Arc<dyn CityStore> = match config.store_backend {
        StoreBackend::Sqlite => {
            let store = SqliteStore::open(&config.db_path)?;
            if store.is_empty()? {
                info!(
                    "Populating database from CSV file: {}",
                    config.csv_path.display()
                );
                let inserted = store.populate_from_csv(&config.csv_path)?;
                info!("Database populated with {} cities", inserted);
            } else {
                info!("Using existing database at {}", config.db_path.display());
            }
            Arc::new(store)
        }
        StoreBackend::Memory => {
            let cities = load_cities(&config.csv_path)?;
            info!(
                "Loaded {} cities into memory from {}",
                cities.len(),
                config.csv_path.display()
            );
            Arc::new(MemoryStore::new(cities))
        }
    };

    info!("Store contains {} cities", store.count()?);
    Ok(store)
}
