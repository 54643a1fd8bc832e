//! API route table.

use axum::routing::get;
use axum::Router;

use super::handlers::{self, GatewayState};

/// Build the /api/v1 router.
pub fn api_routes(state: GatewayState) -> Router {
    Router::new()
        // System
        .route("/system/health", get(handlers::system_health))
        // Vessel search modes
        .route("/vessels/area", get(handlers::vessels_area))
        .route("/vessels/near", get(handlers::vessels_near))
        .route("/vessels/port", get(handlers::vessels_port))
        .route("/vessels/search", get(handlers::vessels_search))
        // Single-vessel pass-through
        .route("/vessels/:mmsi/status", get(handlers::vessel_status))
        .route("/vessels/:mmsi/track", get(handlers::vessel_track))
        // Risk scoring pass-through
        .route("/risk/point", get(handlers::point_risk))
        .with_state(state)
}
