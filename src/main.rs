//! City Autocomplete - city-name suggestions over HTTP
//!
//! Ranks cities by prefix match and search popularity, memoizing lookups in
//! an expiring in-memory cache in front of the record store.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use city_autocomplete::api::{create_router, AppState};
use city_autocomplete::config::Config;
use city_autocomplete::store::open_store;
use city_autocomplete::tasks::{
    create_popularity_queue, spawn_cleanup_task, spawn_popularity_workers,
};

/// How long shutdown waits for queued popularity increments.
const POPULARITY_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Main entry point for the autocomplete server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the record store, seeding it from the CSV file if needed
/// 4. Start the cache reaper and the popularity workers
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "city_autocomplete=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting City Autocomplete Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, cache_ttl={}s, cleanup_interval={}s, port={}",
        config.store_backend, config.cache_ttl, config.cleanup_interval, config.server_port
    );

    let store = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || open_store(&config))
            .await
            .context("store initialisation task failed")?
            .context("failed to open city store")?
    };

    let (popularity, receiver) = create_popularity_queue(config.popularity_queue_capacity);
    let workers = spawn_popularity_workers(store.clone(), receiver, config.popularity_workers);
    info!("{} popularity workers started", workers.len());

    let state = AppState::from_config(&config, store, popularity);

    let reaper = spawn_cleanup_task(
        state.cache.clone(),
        Duration::from_secs(config.cleanup_interval),
    );
    info!("Cache reaper started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);
    info!("Try: http://localhost:{}/autocomplete?q=ber&limit=5", config.server_port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(reaper))
        .await
        .context("server error")?;

    // The router (and every queue handle it held) is gone; workers drain and exit
    let drain = join_workers(workers);
    if tokio::time::timeout(POPULARITY_DRAIN_TIMEOUT, drain).await.is_err() {
        warn!("Popularity workers did not drain in time");
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn join_workers(workers: Vec<tokio::task::JoinHandle<()>>) {
    for worker in workers {
        if let Err(err) = worker.await {
            warn!("Popularity worker failed: {}", err);
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the reaper and allows graceful shutdown.
async fn shutdown_signal(reaper: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    reaper.abort();
    warn!("Cache reaper aborted");
}
