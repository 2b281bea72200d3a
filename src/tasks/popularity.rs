//! Popularity Feedback Workers
//!
//! Search-count increments are queued by request handlers and applied by a
//! fixed pool of worker tasks, so a response never waits on a store write.
//!
//! Architecture:
//! - Bounded MPSC channel; a full queue drops the job instead of blocking
//! - Workers share the receiver and run store calls on the blocking pool
//! - Failed increments are logged and skipped (best effort)
//! - Workers stop once every `PopularityQueue` handle has been dropped

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::City;
use crate::store::CityStore;

/// Cities returned by one successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopularityJob {
    pub geonameids: Vec<String>,
}

impl PopularityJob {
    /// Builds a job covering every city in `cities`.
    pub fn from_cities(cities: &[City]) -> Self {
        Self {
            geonameids: cities.iter().map(|c| c.geonameid.clone()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.geonameids.is_empty()
    }
}

/// Consumer side of the popularity queue.
pub type PopularityReceiver = mpsc::Receiver<PopularityJob>;

/// Producer handle given to request handlers.
#[derive(Debug, Clone)]
pub struct PopularityQueue {
    sender: mpsc::Sender<PopularityJob>,
}

impl PopularityQueue {
    /// Enqueues a job without waiting.
    ///
    /// Returns `false` when the job was dropped because the queue is full or
    /// the workers are gone.
    pub fn submit(&self, job: PopularityJob) -> bool {
        if job.is_empty() {
            return true;
        }

        match self.sender.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(
                    "Popularity queue full, dropping {} increments",
                    job.geonameids.len()
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                warn!(
                    "Popularity queue closed, dropping {} increments",
                    job.geonameids.len()
                );
                false
            }
        }
    }
}

/// Creates a popularity queue holding at most `capacity` pending jobs.
pub fn create_popularity_queue(capacity: usize) -> (PopularityQueue, PopularityReceiver) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (PopularityQueue { sender }, receiver)
}

/// Spawns `workers` tasks that drain `receiver` into `store`.
///
/// # Returns
/// One JoinHandle per worker. Each finishes after the queue is closed and
/// drained.
pub fn spawn_popularity_workers(
    store: Arc<dyn CityStore>,
    receiver: PopularityReceiver,
    workers: usize,
) -> Vec<JoinHandle<()>> {
    let receiver = Arc::new(Mutex::new(receiver));

    (0..workers.max(1))
        .map(|worker| {
            let store = Arc::clone(&store);
            let receiver = Arc::clone(&receiver);

            tokio::spawn(async move {
                debug!("Popularity worker {} started", worker);

                loop {
                    // Only one idle worker waits on the channel at a time
                    let job = receiver.lock().await.recv().await;
                    let Some(job) = job else { break };
                    apply_job(Arc::clone(&store), job).await;
                }

                debug!("Popularity worker {} stopped (queue closed)", worker);
            })
        })
        .collect()
}

async fn apply_job(store: Arc<dyn CityStore>, job: PopularityJob) {
    let total = job.geonameids.len();

    let outcome = tokio::task::spawn_blocking(move || {
        let mut failed = 0;
        for geonameid in &job.geonameids {
            if let Err(err) = store.increment_popularity(geonameid) {
                warn!("Failed to increment popularity for {}: {}", geonameid, err);
                failed += 1;
            }
        }
        failed
    })
    .await;

    match outcome {
        Ok(0) => debug!("Applied {} popularity increments", total),
        Ok(failed) => info!("Applied {} of {} popularity increments", total - failed, total),
        Err(err) => warn!("Popularity job aborted: {}", err),
    }
}
