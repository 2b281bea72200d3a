//! Request and Response models for the autocomplete API
//!
//! This module defines the city record and the DTOs used for
//! serializing/deserializing HTTP requests and responses.

pub mod city;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use city::City;
pub use requests::{clamp_limit, AutocompleteParams, DEFAULT_LIMIT, MAX_LIMIT};
pub use responses::{HealthResponse, StatsResponse};
