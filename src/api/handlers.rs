//! API handlers — consistent envelope, typed responses.
//!
//! All handlers return `Response` via [`ApiResponse::ok`] or
//! [`ApiErrorResponse`]. Validation failures map to 400 before any
//! upstream call; upstream failures map to 502 with the provider message
//! passed through.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::query::{PlannerError, QueryPlanner, ShipSummary};
use crate::risk::{RiskAssessment, RiskClient};
use crate::upstream::AisClient;
use crate::{config, query};

use super::envelope::{ApiErrorResponse, ApiResponse};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub planner: Arc<QueryPlanner>,
    pub client: Arc<AisClient>,
    /// Absent when no risk service is configured — responses are served
    /// un-enriched.
    pub risk: Option<Arc<RiskClient>>,
    pub started_at: Instant,
}

// ============================================================================
// Query types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AreaQuery {
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub minutes_back: Option<f64>,
    #[serde(default)]
    pub with_risk: bool,
}

#[derive(Debug, Deserialize)]
pub struct NearQuery {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub radius_nm: Option<f64>,
    #[serde(default)]
    pub minutes_back: Option<f64>,
    #[serde(default)]
    pub with_risk: bool,
}

#[derive(Debug, Deserialize)]
pub struct PortQuery {
    #[serde(default)]
    pub port: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    #[serde(default)]
    pub minutes_back: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PointRiskQuery {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub month: Option<u32>,
}

// ============================================================================
// Response types
// ============================================================================

/// A ship summary with its optional risk enrichment. With `risk` absent
/// the JSON is exactly the ShipSummary shape.
#[derive(Debug, Serialize)]
pub struct EnrichedShip {
    #[serde(flatten)]
    pub ship: ShipSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskAssessment>,
}

/// Gateway health for `/system/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub cached_entries: usize,
    pub risk_scoring: bool,
    pub max_results: usize,
}

// ============================================================================
// Internal helpers
// ============================================================================

fn planner_error(e: &PlannerError) -> Response {
    match e {
        PlannerError::Validation(v) => ApiErrorResponse::bad_request(v.to_string()),
        PlannerError::Upstream(u) => ApiErrorResponse::bad_gateway(u.to_string()),
    }
}

/// Wrap ships in the envelope, enriching each plottable position with a
/// risk score when requested and configured. The scorer is not
/// credit-metered, so enrichment calls run concurrently; failures degrade
/// to records without a risk field.
async fn respond_ships(state: &GatewayState, ships: Vec<ShipSummary>, with_risk: bool) -> Response {
    let scorer = if with_risk { state.risk.as_deref() } else { None };
    let enriched = join_all(ships.into_iter().map(|ship| async move {
        let risk = match scorer {
            Some(client) if ship.lat.is_finite() && ship.lon.is_finite() => {
                client.try_point_risk(ship.lat, ship.lon, None).await
            }
            _ => None,
        };
        EnrichedShip { ship, risk }
    }))
    .await;
    ApiResponse::ok(enriched)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /system/health
pub async fn system_health(State(state): State<GatewayState>) -> Response {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
        cached_entries: state.client.cache_entries().await,
        risk_scoring: state.risk.is_some(),
        max_results: config::get().query.max_results,
    })
}

/// GET /vessels/area — area-expression search.
pub async fn vessels_area(
    State(state): State<GatewayState>,
    Query(q): Query<AreaQuery>,
) -> Response {
    let expr = q.area.unwrap_or_default();
    match state.planner.search_area(&expr, q.minutes_back).await {
        Ok(ships) => respond_ships(&state, ships, q.with_risk).await,
        Err(e) => planner_error(&e),
    }
}

/// GET /vessels/near — radius search around a point.
pub async fn vessels_near(
    State(state): State<GatewayState>,
    Query(q): Query<NearQuery>,
) -> Response {
    let (Some(lat), Some(lon), Some(radius_nm)) = (q.lat, q.lon, q.radius_nm) else {
        return ApiErrorResponse::bad_request("lat, lon and radius_nm are required");
    };
    match state
        .planner
        .search_near(lat, lon, radius_nm, q.minutes_back)
        .await
    {
        Ok(ships) => respond_ships(&state, ships, q.with_risk).await,
        Err(e) => planner_error(&e),
    }
}

/// GET /vessels/port — vessels currently in a port.
pub async fn vessels_port(
    State(state): State<GatewayState>,
    Query(q): Query<PortQuery>,
) -> Response {
    let Some(port) = q.port.filter(|p| !p.trim().is_empty()) else {
        return ApiErrorResponse::bad_request("port is required");
    };
    match state.planner.search_port(&port).await {
        Ok(ships) => respond_ships(&state, ships, false).await,
        Err(e) => planner_error(&e),
    }
}

/// GET /vessels/search — upstream vessel name search, passed through.
pub async fn vessels_search(
    State(state): State<GatewayState>,
    Query(q): Query<NameQuery>,
) -> Response {
    let Some(name) = q.name.filter(|n| !n.trim().is_empty()) else {
        return ApiErrorResponse::bad_request("name is required");
    };
    match state.client.vessel_search(name.trim()).await {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => ApiErrorResponse::bad_gateway(e.to_string()),
    }
}

/// GET /vessels/:mmsi/status — live single-vessel status, never cached.
pub async fn vessel_status(
    State(state): State<GatewayState>,
    Path(mmsi): Path<String>,
) -> Response {
    if mmsi.is_empty() || !mmsi.chars().all(|c| c.is_ascii_digit()) {
        return ApiErrorResponse::bad_request("mmsi must be numeric");
    }
    match state.client.vessel_status(&mmsi).await {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => ApiErrorResponse::bad_gateway(e.to_string()),
    }
}

/// GET /vessels/:mmsi/track — position history over the query window.
pub async fn vessel_track(
    State(state): State<GatewayState>,
    Path(mmsi): Path<String>,
    Query(q): Query<TrackQuery>,
) -> Response {
    if mmsi.is_empty() || !mmsi.chars().all(|c| c.is_ascii_digit()) {
        return ApiErrorResponse::bad_request("mmsi must be numeric");
    }
    let minutes = query::planner::clamp_minutes_back(q.minutes_back, &config::get().query);
    match state.client.vessel_track(&mmsi, minutes).await {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => ApiErrorResponse::bad_gateway(e.to_string()),
    }
}

/// GET /risk/point — single-location whale-risk score, passed through to
/// the scoring service.
pub async fn point_risk(
    State(state): State<GatewayState>,
    Query(q): Query<PointRiskQuery>,
) -> Response {
    let Some(risk) = state.risk.as_ref() else {
        return ApiErrorResponse::service_unavailable("risk scoring not configured");
    };
    let (Some(lat), Some(lon)) = (q.lat, q.lon) else {
        return ApiErrorResponse::bad_request("lat and lon are required");
    };
    match risk.point_risk(lat, lon, q.month).await {
        Ok(assessment) => ApiResponse::ok(assessment),
        Err(e) => ApiErrorResponse::bad_gateway(e.to_string()),
    }
}
