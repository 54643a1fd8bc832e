//! API Gateway Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! the /api/v1/* endpoints using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port — validation paths reject before any
//! upstream call, so the client points at an unroutable address.

use std::sync::Arc;
use std::time::{Duration, Instant};

use whalesafe_gateway::api::{create_app, GatewayState};
use whalesafe_gateway::config::{self, CacheTtlConfig, GatewayConfig};
use whalesafe_gateway::query::QueryPlanner;
use whalesafe_gateway::upstream::{AisBackend, AisClient, CacheTtls, ResponseCache};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

fn ensure_config() {
    if !config::is_initialized() {
        config::init(GatewayConfig::default());
    }
}

fn create_test_state() -> GatewayState {
    // Unroutable upstream — every test here must finish before the network.
    let client = Arc::new(
        AisClient::new(
            "http://127.0.0.1:9",
            "test-key",
            Duration::from_secs(1),
            Arc::new(ResponseCache::new()),
            CacheTtls::from(&CacheTtlConfig::default()),
        )
        .expect("client construction"),
    );
    let backend: Arc<dyn AisBackend> = client.clone();
    GatewayState {
        planner: Arc::new(QueryPlanner::new(backend)),
        client,
        risk: None,
        started_at: Instant::now(),
    }
}

async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
    ensure_config();
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

/// /system/health returns the envelope with gateway vitals.
#[tokio::test]
async fn test_health_returns_envelope() {
    let (status, json) = get_json("/api/v1/system/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["risk_scoring"], false);
    assert_eq!(json["data"]["cached_entries"], 0);
    assert_eq!(json["meta"]["version"], "1");
}

/// An oversized bounding box is rejected before any upstream call —
/// the client here cannot reach a network, so a 400 proves no call was
/// attempted.
#[tokio::test]
async fn test_oversized_area_rejected_without_upstream() {
    let (status, json) =
        get_json("/api/v1/vessels/area?area=bbox:0%7C0%7C50%7C5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
    assert!(
        json["error"]["message"].as_str().unwrap().contains("latitude"),
        "message should name the offending axis: {}",
        json["error"]["message"]
    );
}

/// Near-me requires lat, lon and radius.
#[tokio::test]
async fn test_near_missing_params_is_400() {
    let (status, json) = get_json("/api/v1/vessels/near?lat=34.0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("radius_nm"));
}

/// Out-of-range coordinates are rejected before the network.
#[tokio::test]
async fn test_near_invalid_latitude_is_400() {
    let (status, _) =
        get_json("/api/v1/vessels/near?lat=123.0&lon=0.0&radius_nm=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Port mode requires an identifier.
#[tokio::test]
async fn test_port_missing_ident_is_400() {
    let (status, json) = get_json("/api/v1/vessels/port").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"].as_str().unwrap().contains("port"));
}

/// Vessel search requires a name.
#[tokio::test]
async fn test_search_missing_name_is_400() {
    let (status, _) = get_json("/api/v1/vessels/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// MMSI path segments must be numeric.
#[tokio::test]
async fn test_non_numeric_mmsi_is_400() {
    let (status, json) = get_json("/api/v1/vessels/PACIFIC/status").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"].as_str().unwrap().contains("mmsi"));
}

/// Risk pass-through is 503 when no scoring service is configured.
#[tokio::test]
async fn test_risk_unconfigured_is_503() {
    let (status, json) = get_json("/api/v1/risk/point?lat=34.0&lon=-120.0").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "SERVICE_UNAVAILABLE");
}

/// Unknown paths fall through to 404.
#[tokio::test]
async fn test_unknown_path_is_404() {
    ensure_config();
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
