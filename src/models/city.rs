//! City record model
//!
//! The JSON field names are part of the public API and must not change.

use serde::{Deserialize, Serialize};

/// A city as stored in the record store and returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct City {
    /// Display name, e.g. "Berlin"
    pub name: String,
    /// Country name
    pub country: String,
    /// First-level subdivision; empty when unknown
    pub subcountry: String,
    /// Stable external identifier (GeoNames id)
    pub geonameid: String,
}

impl City {
    /// Creates a new City
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        subcountry: impl Into<String>,
        geonameid: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            subcountry: subcountry.into(),
            geonameid: geonameid.into(),
        }
    }
}
