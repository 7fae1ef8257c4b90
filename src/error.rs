//! Error types for the response cache service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Service Error Enum ==
/// Unified error type for the response cache service.
///
/// Cloneable: a single in-flight upstream result is handed to every
/// request that joined it, failures included.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Requested resource name is not in the catalogue
    #[error("Unknown resource: {0}")]
    InvalidResource(String),

    /// Upstream call rejected or missed its deadline
    #[error("Upstream failure for {resource}: {reason}")]
    Upstream { resource: String, reason: String },

    /// A member of a batch failed; partial results are discarded
    #[error("Batch request failed: {0}")]
    Aggregate(Box<ServiceError>),
}

impl ServiceError {
    /// Shorthand for an upstream failure on `resource`.
    pub fn upstream(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Upstream {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidResource(_) => StatusCode::NOT_FOUND,
            ServiceError::Upstream { .. } | ServiceError::Aggregate(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the service.
pub type Result<T> = std::result::Result<T, ServiceError>;
