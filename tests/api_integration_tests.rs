//! Integration Tests for API Endpoints
//!
//! Full request/response cycle through the public router. Timing-sensitive
//! tests run on tokio's paused clock.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use response_cache::{api::create_router, upstream::Resource, AppState, Config};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_router(AppState::from_config(&Config::default()))
}

fn create_app_with(config: Config) -> Router {
    create_router(AppState::from_config(&config))
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// == Single Resource ==

#[tokio::test(start_paused = true)]
async fn test_cold_fetch_then_cache_hit() {
    let app = create_test_app();

    let (status, first) = get_json(&app, "/resource/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(first["performance"]["source"], "origin");
    assert_eq!(first["performance"]["cacheHit"], false);
    assert_eq!(first["performance"]["optimization"], "CACHING + FAST_DB");
    assert!(first["data"]["data"].is_string());

    let (status, second) = get_json(&app, "/resource/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["performance"]["source"], "cache");
    assert_eq!(second["performance"]["cacheHit"], true);
    assert_eq!(second["data"], first["data"]);
}

#[tokio::test(start_paused = true)]
async fn test_every_resource_is_served() {
    let app = create_test_app();

    for resource in Resource::ALL {
        let (status, json) = get_json(&app, &format!("/resource/{resource}")).await;
        assert_eq!(status, StatusCode::OK, "{resource}");
        assert_eq!(json["data"]["resource"], resource.as_str());
        assert_eq!(
            json["performance"]["endpoint"],
            format!("/resource/{resource}")
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_after_ttl() {
    let app = create_app_with(Config {
        default_ttl: 1,
        ..Config::default()
    });

    let (_, first) = get_json(&app, "/resource/posts").await;
    assert_eq!(first["performance"]["source"], "origin");

    tokio::time::advance(Duration::from_millis(500)).await;
    let (_, warm) = get_json(&app, "/resource/posts").await;
    assert_eq!(warm["performance"]["source"], "cache");

    tokio::time::advance(Duration::from_millis(600)).await;
    let (_, expired) = get_json(&app, "/resource/posts").await;
    assert_eq!(expired["performance"]["source"], "origin");
    assert_ne!(expired["data"]["id"], first["data"]["id"]);
}

#[tokio::test(start_paused = true)]
async fn test_max_ttl_setting_still_serves() {
    let app = create_app_with(Config {
        default_ttl: u64::MAX,
        ..Config::default()
    });

    let (status, first) = get_json(&app, "/resource/comments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["performance"]["source"], "origin");

    let (status, second) = get_json(&app, "/resource/comments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["performance"]["source"], "cache");
}

#[tokio::test]
async fn test_unknown_resource() {
    let app = create_test_app();

    let (status, json) = get_json(&app, "/resource/widgets").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Unknown resource: widgets");
}

#[tokio::test(start_paused = true)]
async fn test_upstream_failure_is_500() {
    let app = create_app_with(Config {
        failing_resources: vec![Resource::Analytics],
        ..Config::default()
    });

    let (status, json) = get_json(&app, "/resource/analytics").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("analytics"));

    let (status, _) = get_json(&app, "/resource/users").await;
    assert_eq!(status, StatusCode::OK, "other resources are unaffected");
}

// == Batch ==

#[tokio::test(start_paused = true)]
async fn test_batch_returns_all_resources() {
    let app = create_test_app();

    let (status, json) = get_json(&app, "/resource/batch").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["performance"]["optimization"], "parallel");
    assert_eq!(json["performance"]["totalRequests"], 6);

    // Key order is checked on the raw body in the aggregator's own tests;
    // a parsed Value may reorder keys.
    let mut keys: Vec<&str> = json["data"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    let mut expected: Vec<&str> = Resource::ALL.iter().map(|r| r.as_str()).collect();
    keys.sort_unstable();
    expected.sort_unstable();
    assert_eq!(keys, expected);
}

#[tokio::test(start_paused = true)]
async fn test_batch_runs_concurrently() {
    let app = create_test_app();

    let (_, json) = get_json(&app, "/resource/batch?resources=users,posts,comments").await;

    // Fast profile: 50 + 30 + 40 in sequence, 50 when parallel
    let duration = json["performance"]["durationMs"].as_f64().unwrap();
    assert!(duration >= 50.0, "{duration}");
    assert!(duration < 75.0, "{duration}");
}

#[tokio::test(start_paused = true)]
async fn test_batch_shares_cache_with_single_reads() {
    let app = create_test_app();

    let (_, single) = get_json(&app, "/resource/comments").await;
    let (_, batch) = get_json(&app, "/resource/batch?resources=comments,posts").await;

    assert_eq!(batch["data"]["comments"], single["data"]);
    assert_eq!(batch["performance"]["cacheHits"], 1);
    assert_eq!(batch["performance"]["totalRequests"], 2);
}

#[tokio::test(start_paused = true)]
async fn test_batch_fails_as_a_whole() {
    let app = create_app_with(Config {
        failing_resources: vec![Resource::Posts],
        ..Config::default()
    });

    let (status, json) = get_json(&app, "/resource/batch").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert!(json.get("data").is_none());
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Batch request failed"));
}

#[tokio::test]
async fn test_batch_with_unknown_resource() {
    let app = create_test_app();

    let (status, _) = get_json(&app, "/resource/batch?resources=users,bogus").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Baseline ==

#[tokio::test(start_paused = true)]
async fn test_slow_endpoint_never_caches() {
    let app = create_test_app();

    for _ in 0..2 {
        let (status, json) = get_json(&app, "/slow/notifications").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["performance"]["optimization"], "NONE");
        assert_eq!(json["performance"]["source"], "origin");
        assert!(json["performance"]["durationMs"].as_f64().unwrap() >= 1400.0);
    }

    let (_, metrics) = get_json(&app, "/metrics").await;
    assert_eq!(metrics["cacheEntryCount"], 0);
}

// == Health and Metrics ==

#[tokio::test]
async fn test_health() {
    let app = create_test_app();

    let (status, json) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "OK");
    assert!(json["uptimeSeconds"].as_f64().unwrap() >= 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_metrics_reflect_cache_activity() {
    let app = create_test_app();

    get_json(&app, "/resource/users").await;
    get_json(&app, "/resource/users").await;
    get_json(&app, "/resource/posts").await;

    let (status, json) = get_json(&app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cacheEntryCount"], 2);
    assert_eq!(json["cache"]["hits"], 1);
    assert_eq!(json["cache"]["misses"], 2);
    assert!((json["cache"]["hitRate"].as_f64().unwrap() - 1.0 / 3.0).abs() < 1e-9);
    assert!(json["processUptimeSeconds"].as_f64().is_some());
    assert!(json["memoryUsageBytes"].as_u64().is_some());
    assert!(json["cpuUsagePercent"].as_f64().unwrap() >= 0.0);
}
