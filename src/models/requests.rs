//! Request DTOs for the autocomplete API
//!
//! Defines the query-string parameters accepted by the HTTP boundary.

use serde::Deserialize;

use crate::error::AppError;

/// Result count used when `limit` is absent or invalid
pub const DEFAULT_LIMIT: usize = 10;

/// Upper bound applied to any requested `limit`
pub const MAX_LIMIT: usize = 100;

/// Query parameters for `GET /autocomplete`
///
/// Both fields stay raw strings so that a malformed `limit` falls back to the
/// default instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutocompleteParams {
    /// Search text, matched against city names
    #[serde(default)]
    pub q: Option<String>,
    /// Requested number of results
    #[serde(default)]
    pub limit: Option<String>,
}

impl AutocompleteParams {
    /// Returns the raw query text, or a validation error if it is missing or empty.
    pub fn query(&self) -> Result<&str, AppError> {
        match self.q.as_deref() {
            Some(q) if !q.is_empty() => Ok(q),
            _ => Err(AppError::Validation(
                "Query parameter 'q' is required".to_string(),
            )),
        }
    }

    /// Returns the clamped result limit.
    pub fn effective_limit(&self) -> usize {
        clamp_limit(self.limit.as_deref())
    }
}

/// Maps a raw `limit` value onto `1..=MAX_LIMIT`.
///
/// Non-numeric and non-positive values yield [`DEFAULT_LIMIT`]. The value is
/// parsed as-is, so surrounding whitespace makes it invalid.
pub fn clamp_limit(raw: Option<&str>) -> usize {
    match raw.and_then(|v| v.parse::<i64>().ok()) {
        Some(n) if n > 0 => (n as u64).min(MAX_LIMIT as u64) as usize,
        _ => DEFAULT_LIMIT,
    }
}
