//! Raw upstream record shapes.
//!
//! These mirror the provider's JSON as-is; the canonical gateway shape is
//! [`crate::query::normalizer::ShipSummary`]. Every field is optional
//! because the provider omits rather than nulls.

use serde::Deserialize;

/// A vessel as returned by the zone, bulk and status endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoneVessel {
    #[serde(default)]
    pub mmsi: Option<u64>,
    #[serde(default)]
    pub imo: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Speed over ground, knots.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Course over ground, degrees true.
    #[serde(default)]
    pub course: Option<f64>,
    /// AIS navigational status code (0 = under way, 1 = at anchor, ...).
    #[serde(default, rename = "navstat")]
    pub nav_status: Option<i32>,
    #[serde(default, rename = "type")]
    pub vessel_type: Option<String>,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub current_port: Option<String>,
    #[serde(default)]
    pub next_port: Option<String>,
    /// Timestamp of the last position report, provider-formatted.
    #[serde(default)]
    pub last_report: Option<String>,
}

/// A vessel as returned by the in-port listing. Carries port metadata but
/// no position — positions come from a follow-up bulk status call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortVessel {
    #[serde(default)]
    pub mmsi: Option<u64>,
    #[serde(default)]
    pub imo: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub vessel_type: Option<String>,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub current_port: Option<String>,
    /// Arrival timestamp at the current port, provider-formatted.
    #[serde(default)]
    pub arrived: Option<String>,
}

/// A port as returned by the port search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unlocode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}
