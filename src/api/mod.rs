//! REST API module using Axum
//!
//! Provides the HTTP surface consumed by the map UI:
//! - vessel search modes (area / near-me / in-port / name search)
//! - single-vessel status and track pass-through
//! - whale-risk scoring pass-through
//!
//! All responses share the envelope in [`envelope`].

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::GatewayState;

use axum::http::{header, Method};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::defaults;

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `WHALESAFE_CORS_ORIGINS` to a comma-separated list of allowed
/// origins for development (e.g., the map UI's Vite dev server).
fn build_cors_layer() -> CorsLayer {
    match std::env::var(defaults::CORS_ORIGINS_ENV) {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods([Method::GET])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        }
        Err(_) => {
            // No cross-origin allowed — the map UI is same-origin.
            CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        }
    }
}

/// Create the complete application router.
pub fn create_app(state: GatewayState) -> Router {
    let cors = build_cors_layer();

    Router::new()
        .nest("/api/v1", routes::api_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
