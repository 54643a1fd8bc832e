//! Ship Normalizer — canonical vessel shape.
//!
//! Pure mapping from the upstream record shapes (zone/bulk vs in-port) to
//! [`ShipSummary`]. No I/O, no side effects, total over well-formed input.

use chrono::Utc;
use serde::Serialize;

use crate::upstream::records::{PortVessel, ZoneVessel};

/// Canonical vessel record served by every gateway endpoint.
///
/// Immutable after construction, never persisted — a response-shaping DTO
/// only. Records without a usable position carry `NaN` (serialized as
/// `null`) so downstream filtering is a single is-finite predicate across
/// all record sources.
#[derive(Debug, Clone, Serialize)]
pub struct ShipSummary {
    /// Canonical id — see [`canonical_id`] for the fallback chain.
    pub id: String,
    pub mmsi: Option<u64>,
    pub imo: Option<u64>,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    /// Speed over ground, knots. 0.0 when the upstream omits it.
    pub speed_knots: f64,
    /// Course over ground, degrees true.
    pub course_deg: Option<f64>,
    /// AIS navigational status code.
    pub nav_status: Option<i32>,
    pub vessel_type: Option<String>,
    pub flag: Option<String>,
    pub destination: Option<String>,
    pub current_port: Option<String>,
    pub next_port: Option<String>,
    /// Timestamp of the last position report, as the provider formatted it.
    pub last_report: Option<String>,
    /// Which upstream record shape produced this summary.
    pub source: String,
}

/// Canonical id fallback chain: mmsi, then imo, then `name-timestamp`,
/// then a time-based synthetic id. Every normalized record gets a
/// non-empty, collision-resistant id even when upstream omits both
/// canonical identifiers.
pub fn canonical_id(
    mmsi: Option<u64>,
    imo: Option<u64>,
    name: Option<&str>,
    last_report: Option<&str>,
) -> String {
    if let Some(mmsi) = mmsi {
        return mmsi.to_string();
    }
    if let Some(imo) = imo {
        return imo.to_string();
    }
    let now_ms = Utc::now().timestamp_millis();
    if let Some(name) = name.filter(|name| !name.is_empty()) {
        let stamp = last_report.map_or_else(|| now_ms.to_string(), str::to_string);
        return format!("{name}-{stamp}");
    }
    format!("vessel-{now_ms}")
}

/// Normalize a zone / bulk / status record.
pub fn from_zone_record(rec: &ZoneVessel, source: &str) -> ShipSummary {
    ShipSummary {
        id: canonical_id(
            rec.mmsi,
            rec.imo,
            rec.name.as_deref(),
            rec.last_report.as_deref(),
        ),
        mmsi: rec.mmsi,
        imo: rec.imo,
        name: rec.name.clone(),
        lat: rec.lat.unwrap_or(f64::NAN),
        lon: rec.lon.unwrap_or(f64::NAN),
        speed_knots: rec.speed.unwrap_or(0.0),
        course_deg: rec.course,
        nav_status: rec.nav_status,
        vessel_type: rec.vessel_type.clone(),
        flag: rec.flag.clone(),
        destination: rec.destination.clone(),
        current_port: rec.current_port.clone(),
        next_port: rec.next_port.clone(),
        last_report: rec.last_report.clone(),
        source: source.to_string(),
    }
}

/// Normalize an in-port listing record. These carry no coordinates —
/// lat/lon are set to `NaN` explicitly rather than omitted.
pub fn from_port_record(rec: &PortVessel, source: &str) -> ShipSummary {
    ShipSummary {
        id: canonical_id(rec.mmsi, rec.imo, rec.name.as_deref(), rec.arrived.as_deref()),
        mmsi: rec.mmsi,
        imo: rec.imo,
        name: rec.name.clone(),
        lat: f64::NAN,
        lon: f64::NAN,
        speed_knots: 0.0,
        course_deg: None,
        nav_status: None,
        vessel_type: rec.vessel_type.clone(),
        flag: rec.flag.clone(),
        destination: None,
        current_port: rec.current_port.clone(),
        next_port: None,
        last_report: rec.arrived.clone(),
        source: source.to_string(),
    }
}

/// Merge an in-port listing record with its live-status counterpart:
/// position, kinematics and freshness from the status batch, port-specific
/// metadata from the listing.
pub fn merge_port_status(port: &PortVessel, live: &ZoneVessel, source: &str) -> ShipSummary {
    let mut summary = from_zone_record(live, source);
    summary.id = canonical_id(
        port.mmsi.or(live.mmsi),
        port.imo.or(live.imo),
        port.name.as_deref().or(live.name.as_deref()),
        live.last_report.as_deref(),
    );
    summary.mmsi = port.mmsi.or(live.mmsi);
    summary.imo = port.imo.or(live.imo);
    summary.name = port.name.clone().or_else(|| live.name.clone());
    summary.vessel_type = port.vessel_type.clone().or_else(|| live.vessel_type.clone());
    summary.flag = port.flag.clone().or_else(|| live.flag.clone());
    summary.current_port = port.current_port.clone().or_else(|| live.current_port.clone());
    summary
}
