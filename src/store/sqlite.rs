//! SQLite record store
//!
//! Cities live in `cities`, search counts in `city_searches`, joined on
//! `geonameid`. Ranking happens in a single SQL statement.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;
use crate::models::City;

use super::{load_cities, CityStore};

/// Connections opened for a file-backed database
pub const DEFAULT_POOL_SIZE: usize = 4;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA_SQL: &str = r"
    PRAGMA journal_mode = WAL;
    CREATE TABLE IF NOT EXISTS cities (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        country TEXT NOT NULL,
        subcountry TEXT,
        geonameid TEXT UNIQUE NOT NULL
    );

    CREATE TABLE IF NOT EXISTS city_searches (
        geonameid TEXT PRIMARY KEY,
        search_count INTEGER NOT NULL DEFAULT 1,
        last_searched TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (geonameid) REFERENCES cities(geonameid)
    );

    CREATE INDEX IF NOT EXISTS idx_cities_name ON cities(name);
    CREATE INDEX IF NOT EXISTS idx_city_searches_count ON city_searches(search_count DESC);
";

// `fold_case` is registered per connection; SQLite's own LOWER only folds ASCII.
const SEARCH_SQL: &str = r"
    SELECT c.name, c.country, COALESCE(c.subcountry, ''), c.geonameid
    FROM cities c
    LEFT JOIN city_searches cs ON c.geonameid = cs.geonameid
    WHERE instr(fold_case(c.name), ?1) > 0
    ORDER BY
        CASE WHEN instr(fold_case(c.name), ?1) = 1 THEN 1 ELSE 2 END,
        COALESCE(cs.search_count, 0) DESC,
        c.name,
        c.geonameid
    LIMIT ?2
";

/// City store backed by a SQLite database file.
#[derive(Clone)]
pub struct SqliteStore {
    conns: Arc<[Mutex<Connection>]>,
    next: Arc<AtomicUsize>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("connections", &self.conns.len())
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` with [`DEFAULT_POOL_SIZE`] connections.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_pool(path, DEFAULT_POOL_SIZE)
    }

    /// Opens the database at `path` with `pool_size` connections (at least one).
    pub fn open_with_pool(path: impl AsRef<Path>, pool_size: usize) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let first = prepare_connection(Connection::open(path)?)?;
        first.execute_batch(SCHEMA_SQL)?;

        let mut conns = vec![Mutex::new(first)];
        for _ in 1..pool_size.max(1) {
            conns.push(Mutex::new(prepare_connection(Connection::open(path)?)?));
        }
        Ok(Self::from_connections(conns))
    }

    /// Opens a private in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = prepare_connection(Connection::open_in_memory()?)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self::from_connections(vec![Mutex::new(conn)]))
    }

    fn from_connections(conns: Vec<Mutex<Connection>>) -> Self {
        Self {
            conns: conns.into(),
            next: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        // Prefer an idle connection, otherwise wait on the round-robin pick
        for slot in self.conns.iter() {
            if let Ok(mut conn) = slot.try_lock() {
                return f(&mut *conn);
            }
        }
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.conns.len();
        let mut conn = self.conns[idx]
            .lock()
            .map_err(|_| StoreError::LockPoisoned("sqlite"))?;
        f(&mut *conn)
    }

    /// Returns true when the cities table has no rows.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.count()? == 0)
    }

    /// Inserts cities in one transaction, skipping ids that already exist.
    ///
    /// Returns the number of rows inserted.
    pub fn insert_cities(&self, cities: &[City]) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let mut inserted = 0;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR IGNORE INTO cities (name, country, subcountry, geonameid)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for city in cities {
                    inserted += stmt.execute(params![
                        city.name,
                        city.country,
                        city.subcountry,
                        city.geonameid
                    ])?;
                }
            }
            tx.commit()?;
            Ok(inserted)
        })
    }

    /// Loads the CSV file at `path` into the cities table.
    pub fn populate_from_csv(&self, path: impl AsRef<Path>) -> Result<usize, StoreError> {
        let cities = load_cities(path)?;
        self.insert_cities(&cities)
    }
}

fn prepare_connection(conn: Connection) -> Result<Connection, StoreError> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<String>(0)?.to_lowercase()),
    )?;
    Ok(conn)
}

impl CityStore for SqliteStore {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<City>, StoreError> {
        let needle = query.to_lowercase();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(SEARCH_SQL)?;
            let rows = stmt.query_map(params![needle, limit], |row| {
                Ok(City {
                    name: row.get(0)?,
                    country: row.get(1)?,
                    subcountry: row.get(2)?,
                    geonameid: row.get(3)?,
                })
            })?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    fn increment_popularity(&self, geonameid: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                r"
                INSERT INTO city_searches (geonameid, search_count, last_searched)
                VALUES (?1, 1, datetime('now'))
                ON CONFLICT(geonameid) DO UPDATE SET
                    search_count = search_count + 1,
                    last_searched = datetime('now')
                ",
                params![geonameid],
            )?;
            Ok(())
        })
    }

    fn popularity(&self, geonameid: &str) -> Result<u64, StoreError> {
        self.with_conn(|conn| {
            let count = conn
                .query_row(
                    "SELECT search_count FROM city_searches WHERE geonameid = ?1",
                    params![geonameid],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?;
            Ok(count.map_or(0, |c| c.max(0) as u64))
        })
    }

    fn count(&self) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM cities", [], |row| row.get(0))?;
            Ok(count.max(0) as usize)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_cities(&[
                City::new("Berlin", "Germany", "Berlin", "2950159"),
                City::new("Bern", "Switzerland", "Bern", "2661552"),
                City::new("Oberlin", "United States", "Ohio", "5165101"),
                City::new("Überlingen", "Germany", "Baden-Württemberg", "2820577"),
            ])
            .unwrap();
        store
    }

    fn names(cities: &[City]) -> Vec<&str> {
        cities.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_schema_indexes() {
        let store = SqliteStore::open_in_memory().unwrap();
        let indexes = store
            .with_conn(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master
                     WHERE type = 'index' AND name LIKE 'idx_%' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .unwrap();

        // Matching runs through fold_case, so no expression index on name
        assert_eq!(indexes, vec!["idx_cities_name", "idx_city_searches_count"]);
    }

    #[test]
    fn test_search_orders_prefix_then_popularity() {
        let store = seeded();
        for _ in 0..5 {
            store.increment_popularity("2950159").unwrap();
        }
        for _ in 0..2 {
            store.increment_popularity("2661552").unwrap();
        }
        for _ in 0..10 {
            store.increment_popularity("5165101").unwrap();
        }

        let results = store.search("ber", 10).unwrap();

        assert_eq!(names(&results), vec!["Berlin", "Bern", "Oberlin", "Überlingen"]);
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let store = seeded();

        let results = store.search("ÜBER", 10).unwrap();

        assert_eq!(names(&results), vec!["Überlingen"]);
    }

    #[test]
    fn test_search_treats_like_wildcards_literally() {
        let store = seeded();
        assert!(store.search("b%n", 10).unwrap().is_empty());
        assert!(store.search("_er", 10).unwrap().is_empty());
    }

    #[test]
    fn test_search_respects_limit() {
        let store = seeded();
        assert_eq!(store.search("er", 2).unwrap().len(), 2);
    }

    #[test]
    fn test_increment_and_popularity() {
        let store = seeded();

        assert_eq!(store.popularity("2661552").unwrap(), 0);
        store.increment_popularity("2661552").unwrap();
        store.increment_popularity("2661552").unwrap();
        assert_eq!(store.popularity("2661552").unwrap(), 2);
    }

    #[test]
    fn test_insert_ignores_duplicate_ids() {
        let store = seeded();

        let inserted = store
            .insert_cities(&[
                City::new("Berlin", "Germany", "Berlin", "2950159"),
                City::new("Paris", "France", "Île-de-France", "2988507"),
            ])
            .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(store.count().unwrap(), 5);
    }

    #[test]
    fn test_file_database_persists_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            assert!(store.is_empty().unwrap());
            store
                .insert_cities(&[City::new("Bern", "Switzerland", "Bern", "2661552")])
                .unwrap();
            store.increment_popularity("2661552").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.popularity("2661552").unwrap(), 1);
    }
}
