//! Response Cache - cache-aside resource service
//!
//! Serves slow upstream resources through an in-memory TTL cache with
//! single-flight loads, parallel batch fan-out and process metrics.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use config::Config;
pub use error::ServiceError;
pub use tasks::spawn_cleanup_task;
