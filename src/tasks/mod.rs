//! Background Tasks Module
//!
//! Contains background tasks that run alongside request handling.
//!
//! # Tasks
//! - Cache reaper: removes expired query cache entries at a fixed interval
//! - Popularity workers: apply search-count increments off the request path

mod cleanup;
mod popularity;

pub use cleanup::spawn_cleanup_task;
pub use popularity::{
    create_popularity_queue, spawn_popularity_workers, PopularityJob, PopularityQueue,
    PopularityReceiver,
};
