//! Ranking Module
//!
//! Orders candidate cities for a query: prefix matches first, then substring
//! matches, each class sorted by popularity and then by name.

mod engine;


pub use engine::{rank, MatchClass};
