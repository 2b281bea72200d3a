//! In-memory record store
//!
//! Holds the whole data set in a vector and answers searches with a linear
//! scan through the ranking engine.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StoreError;
use crate::models::City;
use crate::ranking::rank;

use super::CityStore;

/// City store backed by a `Vec` and a popularity map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cities: Vec<City>,
    counts: RwLock<HashMap<String, u64>>,
}

impl MemoryStore {
    /// Creates a store with every counter at zero.
    pub fn new(cities: Vec<City>) -> Self {
        Self::with_counts(cities, HashMap::new())
    }

    /// Creates a store with pre-existing search counts keyed by geonameid.
    pub fn with_counts(cities: Vec<City>, counts: HashMap<String, u64>) -> Self {
        Self {
            cities,
            counts: RwLock::new(counts),
        }
    }
}

impl CityStore for MemoryStore {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<City>, StoreError> {
        let counts = self
            .counts
            .read()
            .map_err(|_| StoreError::LockPoisoned("popularity"))?;
        Ok(rank(query, limit, &self.cities, |id| {
            counts.get(id).copied().unwrap_or(0)
        }))
    }

    fn increment_popularity(&self, geonameid: &str) -> Result<(), StoreError> {
        let mut counts = self
            .counts
            .write()
            .map_err(|_| StoreError::LockPoisoned("popularity"))?;
        *counts.entry(geonameid.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn popularity(&self, geonameid: &str) -> Result<u64, StoreError> {
        let counts = self
            .counts
            .read()
            .map_err(|_| StoreError::LockPoisoned("popularity"))?;
        Ok(counts.get(geonameid).copied().unwrap_or(0))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.cities.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryStore {
        MemoryStore::new(vec![
            City::new("Berlin", "Germany", "Berlin", "2950159"),
            City::new("Bern", "Switzerland", "Bern", "2661552"),
            City::new("Oberlin", "United States", "Ohio", "5165101"),
        ])
    }

    #[test]
    fn test_search_ranks_by_class() {
        let store = sample();

        let results = store.search("ber", 10).unwrap();
        let names: Vec<&str> = results.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["Berlin", "Bern", "Oberlin"]);
    }

    #[test]
    fn test_increment_changes_ranking() {
        let store = sample();

        store.increment_popularity("2661552").unwrap();

        let results = store.search("ber", 2).unwrap();
        assert_eq!(results[0].name, "Bern");
        assert_eq!(results[1].name, "Berlin");
    }

    #[test]
    fn test_popularity_defaults_to_zero() {
        let store = sample();

        assert_eq!(store.popularity("2950159").unwrap(), 0);
        store.increment_popularity("2950159").unwrap();
        store.increment_popularity("2950159").unwrap();
        assert_eq!(store.popularity("2950159").unwrap(), 2);
    }

    #[test]
    fn test_count() {
        assert_eq!(sample().count().unwrap(), 3);
        assert_eq!(MemoryStore::default().count().unwrap(), 0);
    }
}
