//! Zone/Radius/Port Query Planner.
//!
//! Converts a logical search mode (area / near-me / in-port) into one or
//! more upstream calls, then merges, deduplicates and caps the result set.
//! Zone queries are awaited sequentially so the cap short-circuit stops
//! spending credits the moment the result set is full.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::config;
use crate::config::{defaults, QueryLimitsConfig};
use crate::upstream::client::{AisBackend, PortSelector, UpstreamError};
use crate::upstream::records::ZoneVessel;

use super::bbox::{self, BoundingBox, ZoneQuery};
use super::normalizer::{self, ShipSummary};
use super::ValidationError;

/// Provenance labels for normalized records.
const SOURCE_ZONE: &str = "zone";
const SOURCE_PORT: &str = "port";

/// Cosine floor for the near-me longitude scaling; keeps the derived box
/// bounded near the poles instead of diverging.
const MIN_COS_LAT: f64 = 0.1;

/// Planner failures. Validation happens before any network call; an
/// upstream failure mid-plan aborts the whole query.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Plans and executes vessel searches against an [`AisBackend`].
pub struct QueryPlanner {
    backend: Arc<dyn AisBackend>,
}

impl QueryPlanner {
    pub fn new(backend: Arc<dyn AisBackend>) -> Self {
        Self { backend }
    }

    /// Area mode: one zone query per normalized box, sequentially, with
    /// id-dedup across boxes and a short-circuit once the cap is reached.
    pub async fn search_area(
        &self,
        expr: &str,
        minutes_back: Option<f64>,
    ) -> Result<Vec<ShipSummary>, PlannerError> {
        let limits = &config::get().query;
        let boxes = bbox::parse_area_expression(expr, limits)?;
        let minutes = clamp_minutes_back(minutes_back, limits);

        let mut seen = HashSet::new();
        let mut ships = Vec::new();
        for (index, bbox) in boxes.iter().enumerate() {
            if ships.len() >= limits.max_results {
                debug!(
                    skipped = boxes.len() - index,
                    "result cap reached, skipping remaining boxes"
                );
                break;
            }
            let zone = ZoneQuery {
                bbox: *bbox,
                minutes_back: minutes,
                extended: false,
            };
            let batch = self.backend.zone_vessels(&zone).await?;
            merge_batch(&mut ships, &mut seen, &batch, limits.max_results);
        }
        Ok(ships)
    }

    /// Near-me mode: center + radius into a single bounding box, one zone
    /// query.
    pub async fn search_near(
        &self,
        lat: f64,
        lon: f64,
        radius_nm: f64,
        minutes_back: Option<f64>,
    ) -> Result<Vec<ShipSummary>, PlannerError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::InvalidCoordinate(format!(
                "latitude {lat} out of range [-90, 90]"
            ))
            .into());
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::InvalidCoordinate(format!(
                "longitude {lon} out of range [-180, 180]"
            ))
            .into());
        }
        if !radius_nm.is_finite() || radius_nm <= 0.0 {
            return Err(ValidationError::InvalidCoordinate(format!(
                "radius_nm {radius_nm} must be positive"
            ))
            .into());
        }

        let limits = &config::get().query;
        let zone = ZoneQuery {
            bbox: near_bbox(lat, lon, radius_nm),
            minutes_back: clamp_minutes_back(minutes_back, limits),
            extended: false,
        };
        let batch = self.backend.zone_vessels(&zone).await?;

        let mut seen = HashSet::new();
        let mut ships = Vec::new();
        merge_batch(&mut ships, &mut seen, &batch, limits.max_results);
        Ok(ships)
    }

    /// Port mode: resolve the identifier, list vessels in port, batch-fetch
    /// their live status, and merge. A vessel missing from the status batch
    /// is dropped — there is no position to plot.
    pub async fn search_port(&self, ident: &str) -> Result<Vec<ShipSummary>, PlannerError> {
        let ident = ident.trim();
        if ident.is_empty() {
            return Err(ValidationError::MissingParameter("port").into());
        }

        let selector = match classify_port_ident(ident) {
            PortIdent::Id(id) => Some(PortSelector::Id(id)),
            PortIdent::Locode(code) => Some(PortSelector::Locode(code)),
            PortIdent::Name(name) => {
                let hits = self.backend.find_ports(&name).await?;
                hits.first().and_then(|port| {
                    port.id
                        .map(|id| PortSelector::Id(id.to_string()))
                        .or_else(|| port.unlocode.clone().map(PortSelector::Locode))
                })
            }
        };
        // Unresolvable port is an empty result, not an error.
        let Some(selector) = selector else {
            return Ok(Vec::new());
        };

        let limits = &config::get().query;
        let mut listing = self.backend.vessels_in_port(&selector).await?;
        listing.truncate(limits.max_port_vessels);

        let mmsis: Vec<String> = listing
            .iter()
            .filter_map(|vessel| vessel.mmsi.map(|mmsi| mmsi.to_string()))
            .collect();
        if mmsis.is_empty() {
            return Ok(Vec::new());
        }

        let live = self.backend.bulk_status(&mmsis).await?;
        let by_mmsi: HashMap<u64, &ZoneVessel> = live
            .iter()
            .filter_map(|vessel| vessel.mmsi.map(|mmsi| (mmsi, vessel)))
            .collect();

        let mut seen = HashSet::new();
        let mut ships = Vec::new();
        let mut dropped = 0usize;
        for port_rec in &listing {
            match port_rec.mmsi.and_then(|mmsi| by_mmsi.get(&mmsi)) {
                Some(live_rec) => {
                    let ship = normalizer::merge_port_status(port_rec, live_rec, SOURCE_PORT);
                    if seen.insert(ship.id.clone()) {
                        ships.push(ship);
                    }
                }
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(dropped, "port vessels missing from status batch");
        }
        Ok(ships)
    }
}

// ============================================================================
// Pure planning helpers
// ============================================================================

/// Dedup a zone batch into the running result set, stopping at the cap.
fn merge_batch(
    ships: &mut Vec<ShipSummary>,
    seen: &mut HashSet<String>,
    batch: &[ZoneVessel],
    cap: usize,
) {
    for rec in batch {
        if ships.len() >= cap {
            break;
        }
        let ship = normalizer::from_zone_record(rec, SOURCE_ZONE);
        if seen.insert(ship.id.clone()) {
            ships.push(ship);
        }
    }
}

/// Round and clamp a caller-supplied freshness window into the upstream
/// contract: the provider floor is 60 minutes, the ceiling is configured.
pub(crate) fn clamp_minutes_back(requested: Option<f64>, limits: &QueryLimitsConfig) -> u32 {
    let ceiling = limits.max_minutes_back.max(defaults::MINUTES_BACK_FLOOR);
    match requested {
        None => limits
            .default_minutes_back
            .clamp(defaults::MINUTES_BACK_FLOOR, ceiling),
        Some(value) if value.is_finite() => {
            let rounded = value.round();
            let bounded = rounded
                .max(f64::from(defaults::MINUTES_BACK_FLOOR))
                .min(f64::from(ceiling));
            bounded as u32
        }
        Some(_) => limits
            .default_minutes_back
            .clamp(defaults::MINUTES_BACK_FLOOR, ceiling),
    }
}

/// Derive the near-me bounding box: 1 nm ≈ 1/60 degree of latitude, and a
/// longitude degree scaled by cos(latitude) floored at [`MIN_COS_LAT`].
pub(crate) fn near_bbox(lat: f64, lon: f64, radius_nm: f64) -> BoundingBox {
    let dlat = radius_nm / 60.0;
    let cos_lat = lat.to_radians().cos().max(MIN_COS_LAT);
    let dlon = radius_nm / (60.0 * cos_lat);
    BoundingBox {
        min_lat: lat - dlat,
        max_lat: lat + dlat,
        min_lon: lon - dlon,
        max_lon: lon + dlon,
    }
    .clamp_coords()
}

/// How a free-form port identifier resolves: all digits is a raw provider
/// port id, five ASCII letters is a UN/LOCODE, anything else is a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PortIdent {
    Id(String),
    Locode(String),
    Name(String),
}

pub(crate) fn classify_port_ident(ident: &str) -> PortIdent {
    let trimmed = ident.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        PortIdent::Id(trimmed.to_string())
    } else if trimmed.len() == 5 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        PortIdent::Locode(trimmed.to_ascii_uppercase())
    } else {
        PortIdent::Name(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> QueryLimitsConfig {
        QueryLimitsConfig::default()
    }

    #[test]
    fn minutes_back_below_floor_clamps_up() {
        assert_eq!(clamp_minutes_back(Some(45.0), &limits()), 60);
    }

    #[test]
    fn minutes_back_above_ceiling_clamps_down() {
        assert_eq!(clamp_minutes_back(Some(10_000.0), &limits()), 720);
    }

    #[test]
    fn minutes_back_is_rounded() {
        assert_eq!(clamp_minutes_back(Some(90.4), &limits()), 90);
        assert_eq!(clamp_minutes_back(Some(90.6), &limits()), 91);
    }

    #[test]
    fn minutes_back_absent_uses_configured_default() {
        assert_eq!(clamp_minutes_back(None, &limits()), 120);
    }

    #[test]
    fn near_bbox_at_equator_has_equal_spans() {
        let bbox = near_bbox(0.0, 0.0, 60.0);
        assert!((bbox.lat_span() - 2.0).abs() < 1e-9);
        assert!((bbox.lon_span() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn near_bbox_longitude_widens_with_latitude() {
        let bbox = near_bbox(60.0, 10.0, 60.0);
        // cos(60°) = 0.5 → longitude span doubles.
        assert!((bbox.lat_span() - 2.0).abs() < 1e-9);
        assert!((bbox.lon_span() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn near_bbox_near_pole_is_capped_by_cosine_floor() {
        let bbox = near_bbox(89.9, 0.0, 6.0);
        // Floored cosine: 6 nm / (60 * 0.1) = 1 degree half-span.
        assert!((bbox.lon_span() - 2.0).abs() < 1e-6);
        // Latitude clamped to the pole.
        assert_eq!(bbox.max_lat, 90.0);
    }

    #[test]
    fn numeric_ident_is_a_port_id() {
        assert_eq!(
            classify_port_ident("12345"),
            PortIdent::Id("12345".to_string())
        );
    }

    #[test]
    fn five_letters_is_a_locode_uppercased() {
        assert_eq!(
            classify_port_ident("deham"),
            PortIdent::Locode("DEHAM".to_string())
        );
    }

    #[test]
    fn anything_else_is_a_name_search() {
        assert_eq!(
            classify_port_ident("Long Beach"),
            PortIdent::Name("Long Beach".to_string())
        );
        // Six letters is not a LOCODE.
        assert_eq!(
            classify_port_ident("hamburg"),
            PortIdent::Name("hamburg".to_string())
        );
    }
}
