//! Upstream AIS provider integration.
//!
//! Single point of contact with the paid provider: credential injection,
//! response-envelope validation, and the per-endpoint TTL cache that bounds
//! credit spend.

pub mod cache;
pub mod client;
pub mod records;

pub use cache::ResponseCache;
pub use client::{AisBackend, AisClient, CacheTtls, PortSelector, UpstreamError};
pub use records::{PortRecord, PortVessel, ZoneVessel};
