//! API Module
//!
//! HTTP handlers and routing for the response cache service.
//!
//! # Endpoints
//! - `GET /resource/:name` - Cache-aside read of one resource
//! - `GET /resource/batch` - Parallel read of several resources
//! - `GET /slow/:name` - Uncached baseline read
//! - `GET /health` - Health check endpoint
//! - `GET /metrics` - Cache and process metrics

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
