//! Query planning: area expressions, search modes, canonical vessel shape.
//!
//! Everything here runs before (or after) the network — validation rejects
//! unbounded-cost queries without spending a single upstream credit, and
//! normalization gives downstream consumers one vessel shape regardless of
//! which upstream endpoint produced the record.

pub mod bbox;
pub mod normalizer;
pub mod planner;

pub use bbox::{BoundingBox, ZoneQuery};
pub use normalizer::ShipSummary;
pub use planner::{PlannerError, QueryPlanner};

/// Request validation failures. Raised before any network call — cheap,
/// immediate, and free of upstream credits.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("bounding box spans {span:.1}° of {axis}, maximum is {max:.1}° — narrow the area")]
    SpanTooLarge {
        axis: &'static str,
        span: f64,
        max: f64,
    },
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
}
