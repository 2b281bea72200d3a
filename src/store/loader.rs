//! City data file loader
//!
//! Reads `name,country,subcountry,geonameid` rows. The first row is a header;
//! fields are trimmed and rows with fewer than four fields are skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::error::StoreError;
use crate::models::City;

/// Loads every city from the CSV file at `path`.
pub fn load_cities(path: impl AsRef<Path>) -> Result<Vec<City>, StoreError> {
    let file = File::open(path.as_ref())?;
    read_cities(file)
}

/// Parses cities from any CSV source.
pub fn read_cities<R: Read>(source: R) -> Result<Vec<City>, StoreError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);

    let mut cities = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() < 4 {
            debug!("Skipping short row {} ({} fields)", row + 1, record.len());
            continue;
        }
        cities.push(City::new(&record[0], &record[1], &record[2], &record[3]));
    }

    Ok(cities)
}
