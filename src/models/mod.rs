//! Request and response models for the HTTP API

pub mod requests;
pub mod responses;

pub use requests::BatchQuery;
pub use responses::{BatchPerformance, BatchResponse, HealthResponse, Performance, ResourceResponse};
