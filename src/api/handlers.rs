//! API Handlers
//!
//! HTTP request handlers for each autocomplete server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{
        header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::cache::{QueryCache, QueryKey};
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::models::{AutocompleteParams, HealthResponse, StatsResponse};
use crate::store::CityStore;
use crate::tasks::{PopularityJob, PopularityQueue};

/// Application state shared across all handlers.
///
/// Built once at startup; every field is a cheap shared handle.
#[derive(Clone)]
pub struct AppState {
    /// Record store answering cache misses
    pub store: Arc<dyn CityStore>,
    /// Expiring cache of ranked lookups
    pub cache: QueryCache,
    /// Producer side of the popularity feedback queue
    pub popularity: PopularityQueue,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(store: Arc<dyn CityStore>, cache: QueryCache, popularity: PopularityQueue) -> Self {
        Self {
            store,
            cache,
            popularity,
        }
    }

    /// Creates a new AppState using the cache TTL from configuration.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn CityStore>,
        popularity: PopularityQueue,
    ) -> Self {
        let cache = QueryCache::new(std::time::Duration::from_secs(config.cache_ttl));
        Self::new(store, cache, popularity)
    }
}

/// Handler for GET /
pub async fn index_handler() -> &'static str {
    "City Autocomplete API\n\nUse /autocomplete?q=searchterm to search for cities"
}

/// Handler for GET /autocomplete
///
/// Validates the query, serves ranked cities through the cache and queues a
/// popularity increment for every returned city once the body is ready.
pub async fn autocomplete_handler(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> Result<Response> {
    let query = params.query()?.to_string();
    let limit = params.effective_limit();

    let store = Arc::clone(&state.store);
    let key = QueryKey::new(query.clone(), limit);
    let results = state
        .cache
        .get_or_compute(key, move || async move {
            tokio::task::spawn_blocking(move || store.search(&query, limit))
                .await
                .map_err(|err| StoreError::Task(err.to_string()))?
        })
        .await?;

    let body = serde_json::to_vec(&*results)?;
    debug!("Returning {} cities", results.len());

    // Fire-and-forget: the response does not depend on this
    state
        .popularity
        .submit(PopularityJob::from_cities(&results));

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
        ],
        body,
    )
        .into_response())
}

/// Handler for GET /stats
///
/// Returns current query cache statistics and the entry TTL.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    Json(StatsResponse::new(stats, state.cache.ttl()))
}

/// Handler for GET /health
///
/// Reports health along with the number of cities the store holds.
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let store = Arc::clone(&state.store);
    let cities = tokio::task::spawn_blocking(move || store.count())
        .await
        .map_err(|err| StoreError::Task(err.to_string()))??;

    Ok(Json(HealthResponse::healthy(cities)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::City;
    use crate::store::MemoryStore;
    use crate::tasks::create_popularity_queue;

    fn test_state() -> AppState {
        let store = Arc::new(MemoryStore::new(vec![
            City::new("Berlin", "Germany", "Berlin", "2950159"),
            City::new("Bern", "Switzerland", "Bern", "2661552"),
        ]));
        let (popularity, _receiver) = create_popularity_queue(16);
        AppState::new(store, QueryCache::default(), popularity)
    }

    fn params(q: Option<&str>, limit: Option<&str>) -> Query<AutocompleteParams> {
        Query(AutocompleteParams {
            q: q.map(str::to_string),
            limit: limit.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_autocomplete_handler_success() {
        let state = test_state();

        let response = autocomplete_handler(State(state.clone()), params(Some("ber"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_autocomplete_handler_missing_query() {
        let state = test_state();

        let result = autocomplete_handler(State(state.clone()), params(None, Some("5"))).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(state.cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert_eq!(
            response.ttl_seconds,
            crate::cache::DEFAULT_TTL.as_secs()
        );
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler(State(test_state())).await.unwrap();
        assert_eq!(response.status, "healthy");
        assert_eq!(response.cities, 2);
    }

    #[tokio::test]
    async fn test_index_handler() {
        assert!(index_handler().await.contains("/autocomplete?q="));
    }
}
