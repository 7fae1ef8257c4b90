//! Response DTOs for the HTTP API
//!
//! Field names are camelCase on the wire.

use serde::Serialize;
use serde_json::Value;

use crate::fetch::{BatchResult, FetchResult, FetchSource, OrderedPayloads};

fn millis(duration: std::time::Duration) -> f64 {
    duration.as_micros() as f64 / 1000.0
}

// == Single Resource ==
/// Response body for `GET /resource/{name}` and `GET /slow/{name}`
#[derive(Debug, Clone, Serialize)]
pub struct ResourceResponse {
    pub success: bool,
    pub data: Value,
    pub performance: Performance,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub duration_ms: f64,
    pub source: FetchSource,
    pub optimization: &'static str,
    pub endpoint: String,
    pub cache_hit: bool,
}

impl ResourceResponse {
    /// Wraps a cached-path fetch.
    pub fn cached(result: FetchResult) -> Self {
        Self {
            success: true,
            performance: Performance {
                duration_ms: millis(result.duration),
                source: result.source,
                optimization: result.resource.optimization(),
                endpoint: format!("/resource/{}", result.resource),
                cache_hit: result.cache_hit(),
            },
            data: result.payload,
        }
    }

    /// Wraps a direct, uncached upstream call.
    pub fn baseline(endpoint: String, data: Value, duration: std::time::Duration) -> Self {
        Self {
            success: true,
            data,
            performance: Performance {
                duration_ms: millis(duration),
                source: FetchSource::Origin,
                optimization: "NONE",
                endpoint,
                cache_hit: false,
            },
        }
    }
}

// == Batch ==
/// Response body for `GET /resource/batch`
#[derive(Debug, Serialize)]
pub struct BatchResponse<'a> {
    pub success: bool,
    pub data: OrderedPayloads<'a>,
    pub performance: BatchPerformance,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPerformance {
    pub duration_ms: f64,
    pub optimization: &'static str,
    pub endpoint: &'static str,
    pub total_requests: usize,
    pub cache_hits: usize,
}

impl<'a> BatchResponse<'a> {
    pub fn new(batch: &'a BatchResult) -> Self {
        Self {
            success: true,
            data: batch.payloads(),
            performance: BatchPerformance {
                duration_ms: millis(batch.duration),
                optimization: "parallel",
                endpoint: "/resource/batch",
                total_requests: batch.total_requests(),
                cache_hits: batch.cache_hits(),
            },
        }
    }
}

// == Health ==
/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: f64,
    /// Current time in RFC 3339
    pub timestamp: String,
}

impl HealthResponse {
    pub fn ok(uptime_seconds: f64) -> Self {
        Self {
            status: "OK",
            uptime_seconds,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
