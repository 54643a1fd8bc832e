//! Bounding-box normalization.
//!
//! Turns free-form area expressions — comma-separated preset names and/or
//! explicit `bbox:minLat|minLon|maxLat|maxLon` tokens — into validated,
//! size-capped bounding boxes. Oversized spans are a hard reject, not a
//! silent clamp: every zone query spends paid API credits in proportion to
//! its area.

use serde::Serialize;
use tracing::debug;

use crate::config::QueryLimitsConfig;

use super::ValidationError;

/// A geographic bounding box in degrees.
///
/// Invariants after [`normalize_box`]: `min_lat <= max_lat`,
/// `min_lon <= max_lon`, per-axis span within the configured maximum,
/// coordinates inside [-90, 90] / [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Clamp coordinates to valid latitude / longitude ranges.
    pub(crate) fn clamp_coords(mut self) -> Self {
        self.min_lat = self.min_lat.clamp(-90.0, 90.0);
        self.max_lat = self.max_lat.clamp(-90.0, 90.0);
        self.min_lon = self.min_lon.clamp(-180.0, 180.0);
        self.max_lon = self.max_lon.clamp(-180.0, 180.0);
        self
    }
}

/// One upstream zone query: a box, a report-freshness window, and the
/// response verbosity. Built per request, discarded after use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneQuery {
    pub bbox: BoundingBox,
    /// Minutes of report history to include. Already clamped to the
    /// upstream contract by the planner.
    pub minutes_back: u32,
    /// `extended` responses carry voyage metadata at a higher credit cost.
    pub extended: bool,
}

// ============================================================================
// Presets
// ============================================================================

/// Box used when the area expression is empty or entirely unparseable.
/// Area search must always return something plottable.
const DEFAULT_BOX: BoundingBox = BoundingBox {
    min_lat: 32.0,
    max_lat: 42.0,
    min_lon: -126.0,
    max_lon: -116.0,
};

/// Fixed regional presets, keyed by uppercased name. Centered on known
/// whale aggregation areas plus the shipping regions the UI exposes.
const PRESETS: &[(&str, BoundingBox)] = &[
    ("CALIFORNIA", DEFAULT_BOX),
    (
        "SOCAL",
        BoundingBox {
            min_lat: 32.0,
            max_lat: 35.5,
            min_lon: -122.0,
            max_lon: -116.5,
        },
    ),
    (
        "SANTA_BARBARA",
        BoundingBox {
            min_lat: 33.4,
            max_lat: 34.8,
            min_lon: -121.0,
            max_lon: -118.5,
        },
    ),
    (
        "MONTEREY",
        BoundingBox {
            min_lat: 36.0,
            max_lat: 37.2,
            min_lon: -123.5,
            max_lon: -121.5,
        },
    ),
    (
        "SALISH_SEA",
        BoundingBox {
            min_lat: 47.0,
            max_lat: 50.5,
            min_lon: -126.0,
            max_lon: -122.0,
        },
    ),
    (
        "HAWAII",
        BoundingBox {
            min_lat: 18.5,
            max_lat: 22.5,
            min_lon: -161.0,
            max_lon: -154.0,
        },
    ),
    (
        "STELLWAGEN",
        BoundingBox {
            min_lat: 41.8,
            max_lat: 42.8,
            min_lon: -71.0,
            max_lon: -69.8,
        },
    ),
    (
        "GULF_OF_MAINE",
        BoundingBox {
            min_lat: 42.0,
            max_lat: 45.2,
            min_lon: -71.0,
            max_lon: -65.0,
        },
    ),
];

fn preset(name: &str) -> Option<BoundingBox> {
    let upper = name.to_ascii_uppercase();
    PRESETS
        .iter()
        .find(|(preset_name, _)| *preset_name == upper)
        .map(|(_, bbox)| *bbox)
}

// ============================================================================
// Parsing & normalization
// ============================================================================

/// Parse an area expression into normalized boxes.
///
/// Malformed tokens are silently dropped; an expression that yields no
/// boxes at all falls back to the default preset. A box whose span exceeds
/// the configured maximum fails the whole call.
pub fn parse_area_expression(
    expr: &str,
    limits: &QueryLimitsConfig,
) -> Result<Vec<BoundingBox>, ValidationError> {
    let mut boxes = Vec::new();
    for token in expr.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some(bbox) = preset(token) {
            boxes.push(bbox);
        } else if let Some(bbox) = parse_bbox_token(token) {
            boxes.push(bbox);
        } else {
            debug!(token = %token, "dropping unrecognized area token");
        }
    }

    if boxes.is_empty() {
        boxes.push(DEFAULT_BOX);
    }

    boxes
        .into_iter()
        .map(|bbox| normalize_box(bbox, limits))
        .collect()
}

/// Parse an explicit `bbox:minLat|minLon|maxLat|maxLon` token.
fn parse_bbox_token(token: &str) -> Option<BoundingBox> {
    let rest = token.strip_prefix("bbox:")?;
    let parts: Vec<f64> = rest
        .split('|')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.len() != 4 || parts.iter().any(|value| !value.is_finite()) {
        return None;
    }
    Some(BoundingBox {
        min_lat: parts[0],
        min_lon: parts[1],
        max_lat: parts[2],
        max_lon: parts[3],
    })
}

/// Order the corners, enforce the span caps, clamp to valid ranges.
pub(crate) fn normalize_box(
    mut bbox: BoundingBox,
    limits: &QueryLimitsConfig,
) -> Result<BoundingBox, ValidationError> {
    if bbox.min_lat > bbox.max_lat {
        std::mem::swap(&mut bbox.min_lat, &mut bbox.max_lat);
    }
    if bbox.min_lon > bbox.max_lon {
        std::mem::swap(&mut bbox.min_lon, &mut bbox.max_lon);
    }

    if bbox.lat_span() > limits.max_lat_span_deg {
        return Err(ValidationError::SpanTooLarge {
            axis: "latitude",
            span: bbox.lat_span(),
            max: limits.max_lat_span_deg,
        });
    }
    if bbox.lon_span() > limits.max_lon_span_deg {
        return Err(ValidationError::SpanTooLarge {
            axis: "longitude",
            span: bbox.lon_span(),
            max: limits.max_lon_span_deg,
        });
    }

    Ok(bbox.clamp_coords())
}
