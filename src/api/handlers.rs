//! API Handlers
//!
//! HTTP request handlers for each endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::cache::{CacheStore, SharedCache};
use crate::config::Config;
use crate::error::Result;
use crate::fetch::{call_upstream, fetch_all, ResourceFetcher};
use crate::metrics::{MetricsReport, MetricsReporter};
use crate::models::{BatchQuery, BatchResponse, HealthResponse, ResourceResponse};
use crate::upstream::{LatencyProfile, Resource, SimulatedUpstream, Upstream};

/// Application state shared across all handlers.
///
/// Everything is constructed once at startup and injected here; there is
/// no process-global cache.
#[derive(Clone)]
pub struct AppState {
    /// Response cache, also swept by the cleanup task
    pub cache: SharedCache,
    /// Cached path
    pub fetcher: Arc<ResourceFetcher>,
    /// Uncached baseline path
    pub baseline: Arc<dyn Upstream>,
    pub metrics: MetricsReporter,
    pub upstream_timeout: Duration,
}

impl AppState {
    /// Wires a state around explicit upstreams.
    ///
    /// `upstream` sits behind the cache; `baseline` serves `/slow/*`.
    pub fn new(config: &Config, upstream: Arc<dyn Upstream>, baseline: Arc<dyn Upstream>) -> Self {
        let cache: SharedCache = Arc::new(RwLock::new(CacheStore::new(
            config.max_entries,
            config.ttl(),
        )));
        let fetcher = ResourceFetcher::new(cache.clone(), upstream, config.upstream_timeout());

        Self {
            cache,
            fetcher: Arc::new(fetcher),
            baseline,
            metrics: MetricsReporter::new(),
            upstream_timeout: config.upstream_timeout(),
        }
    }

    /// Creates the state with simulated upstreams: fast behind the cache,
    /// slow for the baseline. Both honor `failing_resources`.
    pub fn from_config(config: &Config) -> Self {
        let failing = config.failing_resources.iter().copied();
        let upstream = SimulatedUpstream::new(LatencyProfile::Fast).with_failures(failing.clone());
        let baseline = SimulatedUpstream::new(LatencyProfile::Slow).with_failures(failing);

        Self::new(config, Arc::new(upstream), Arc::new(baseline))
    }
}

/// Handler for GET /resource/:name
///
/// Cache-aside read of a single resource.
pub async fn resource_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ResourceResponse>> {
    let resource: Resource = name.parse()?;
    let result = state.fetcher.fetch(resource).await?;

    Ok(Json(ResourceResponse::cached(result)))
}

/// Handler for GET /resource/batch
///
/// Fetches the selected resources (default: all) concurrently.
pub async fn batch_handler(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
) -> Result<Response> {
    let resources = query.resolve()?;
    let batch = fetch_all(&state.fetcher, &resources).await?;

    Ok(Json(BatchResponse::new(&batch)).into_response())
}

/// Handler for GET /slow/:name
///
/// Unoptimized baseline: straight to the slow upstream, nothing cached.
pub async fn slow_resource_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ResourceResponse>> {
    let resource: Resource = name.parse()?;
    let started = Instant::now();
    let data = call_upstream(state.baseline.as_ref(), resource, state.upstream_timeout).await?;

    Ok(Json(ResourceResponse::baseline(
        format!("/slow/{resource}"),
        data,
        started.elapsed(),
    )))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.metrics.uptime_seconds()))
}

/// Handler for GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsReport> {
    let stats = state.cache.read().await.stats();
    Json(state.metrics.report(stats))
}
