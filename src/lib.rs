//! WhaleSafe Gateway: Credit-Aware AIS Aggregation
//!
//! HTTP gateway over a paid vessel-tracking provider, with whale-strike
//! risk enrichment for the map UI.
//!
//! ## Architecture
//!
//! - **Upstream AIS Client**: authenticated provider access, envelope
//!   validation, per-endpoint TTL cache
//! - **Bounding-Box Normalizer**: area expressions into validated,
//!   size-capped boxes
//! - **Query Planner**: area / near-me / in-port modes into zone queries,
//!   merged, deduplicated, capped
//! - **Ship Normalizer**: heterogeneous upstream records into one
//!   canonical `ShipSummary`
//! - **Risk Client**: external whale-collision scoring service (optional)

pub mod api;
pub mod config;
pub mod query;
pub mod risk;
pub mod upstream;

// Re-export gateway configuration
pub use config::GatewayConfig;

// Re-export commonly used types
pub use query::{BoundingBox, PlannerError, QueryPlanner, ShipSummary, ZoneQuery};
pub use upstream::{AisBackend, AisClient, CacheTtls, ResponseCache, UpstreamError};

// Re-export risk scoring
pub use risk::{RiskAssessment, RiskClient};
