//! API Module
//!
//! HTTP handlers and routing for the autocomplete REST API.
//!
//! # Endpoints
//! - `GET /` - Plain-text usage banner
//! - `GET /autocomplete?q=<text>&limit=<n>` - Ranked city suggestions
//! - `GET /stats` - Query cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
