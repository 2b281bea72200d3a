//! Error types for the autocomplete server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

// == Store Error Enum ==
/// Failure talking to a record store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite query or connection failure
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Malformed city data file
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding store state was poisoned by a panicking holder
    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),

    /// The blocking task running the store call failed
    #[error("store task failed: {0}")]
    Task(String),
}

// == App Error Enum ==
/// Error type surfaced at the HTTP boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed request input
    #[error("{0}")]
    Validation(String),

    /// Lookup against the record store failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Response serialization failed
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Store(err) => {
                error!("Lookup failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Encoding(err) => {
                error!("Failed to encode response: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error encoding JSON response".to_string(),
                )
            }
        };

        // A String body is served as text/plain
        (status, message).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP layer.
pub type Result<T> = std::result::Result<T, AppError>;
