//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    batch_handler, health_handler, metrics_handler, resource_handler, slow_resource_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /resource/batch` - All (or `?resources=`) resources in parallel
/// - `GET /resource/:name` - One resource through the cache
/// - `GET /slow/:name` - One resource straight from the slow upstream
/// - `GET /health` - Liveness and uptime
/// - `GET /metrics` - Cache and process metrics
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/resource/batch", get(batch_handler))
        .route("/resource/:name", get(resource_handler))
        .route("/slow/:name", get(slow_resource_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
