//! System-wide default constants.
//!
//! Centralises magic numbers and environment variable names so they are not
//! scattered across the codebase. Grouped by subsystem for easy discovery.

// ============================================================================
// Environment
// ============================================================================

/// Environment variable holding the upstream AIS provider credential.
///
/// Required — the gateway refuses to start without it.
pub const API_KEY_ENV: &str = "WHALESAFE_AIS_API_KEY";

/// Environment variable pointing to an alternative TOML config file.
pub const CONFIG_PATH_ENV: &str = "WHALESAFE_CONFIG";

/// Comma-separated list of allowed CORS origins for development.
pub const CORS_ORIGINS_ENV: &str = "WHALESAFE_CORS_ORIGINS";

// ============================================================================
// Upstream query contract
// ============================================================================

/// Upstream floor for the `timespan` parameter (minutes).
///
/// The provider rejects anything lower; caller-supplied values below this
/// are clamped up, never passed through.
pub const MINUTES_BACK_FLOOR: u32 = 60;

/// Default ceiling for the `timespan` parameter (minutes). 720 = 12 hours.
pub const MINUTES_BACK_CEILING: u32 = 720;

/// Default `timespan` when the caller supplies none (minutes).
pub const DEFAULT_MINUTES_BACK: u32 = 120;

// ============================================================================
// Credit guards
// ============================================================================

/// Maximum latitude span of a single zone query (degrees).
pub const DEFAULT_MAX_LAT_SPAN_DEG: f64 = 12.0;

/// Maximum longitude span of a single zone query (degrees).
pub const DEFAULT_MAX_LON_SPAN_DEG: f64 = 15.0;

/// Maximum vessels returned from any search mode.
pub const DEFAULT_MAX_RESULTS: usize = 200;

/// Maximum vessels enriched with live status per port query.
///
/// Each enrichment is a paid bulk-status lookup, so this bounds the credit
/// cost of a single `/vessels/port` request.
pub const DEFAULT_MAX_PORT_VESSELS: usize = 25;

// ============================================================================
// Cache TTLs (seconds)
// ============================================================================

/// Point-status lookups are never cached — status is the one field users
/// check live.
pub const DEFAULT_STATUS_TTL_SECS: u64 = 0;

/// Zone / bulk lookups absorb bursts of nearby requests.
pub const DEFAULT_ZONE_TTL_SECS: u64 = 90;

/// Name searches are slow-changing reference data.
pub const DEFAULT_SEARCH_TTL_SECS: u64 = 600;

/// Port lookups and in-port listings.
pub const DEFAULT_PORT_TTL_SECS: u64 = 300;

// ============================================================================
// HTTP
// ============================================================================

/// Upstream request timeout (seconds).
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Risk-scoring service request timeout (seconds).
pub const DEFAULT_RISK_TIMEOUT_SECS: u64 = 10;
