//! AIS Client — single point of contact with the paid upstream provider.
//!
//! Owns credential injection, response-envelope validation and the TTL
//! cache. Every endpoint the gateway consumes goes through [`AisClient::request`],
//! so no other module can issue an uncached, unauthenticated or
//! unvalidated upstream call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::CacheTtlConfig;
use crate::query::bbox::ZoneQuery;

use super::cache::{cache_key, ResponseCache};
use super::records::{PortRecord, PortVessel, ZoneVessel};

// ============================================================================
// Endpoint paths
// ============================================================================

const VESSEL_STATUS: &str = "/vessels/status";
const VESSEL_ZONE: &str = "/vessels/zone";
const VESSEL_TRACK: &str = "/vessels/track";
const VESSEL_SEARCH: &str = "/vessels/search";
const VESSEL_BULK: &str = "/vessels/bulk";
const PORT_SEARCH: &str = "/ports/search";
const PORT_VESSELS: &str = "/ports/vessels";

// ============================================================================
// Errors
// ============================================================================

/// Upstream client errors.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("AIS credential missing — set {0}")]
    MissingCredential(&'static str),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned HTTP {0}")]
    ServerError(reqwest::StatusCode),
    #[error("upstream rejected request: {message} (code {code})")]
    Envelope { code: String, message: String },
    #[error("malformed upstream payload: {0}")]
    Payload(#[from] serde_json::Error),
}

// ============================================================================
// TTL policy
// ============================================================================

/// Per-endpoint-class cache TTLs, resolved from config at startup.
///
/// The differentiated policy is deliberate: a single TTL would either
/// waste API credits (too low for reference data) or return stale live
/// positions (too high for status).
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub status: Duration,
    pub zone: Duration,
    pub search: Duration,
    pub port: Duration,
}

impl From<&CacheTtlConfig> for CacheTtls {
    fn from(cfg: &CacheTtlConfig) -> Self {
        Self {
            status: Duration::from_secs(cfg.status_ttl_secs),
            zone: Duration::from_secs(cfg.zone_ttl_secs),
            search: Duration::from_secs(cfg.search_ttl_secs),
            port: Duration::from_secs(cfg.port_ttl_secs),
        }
    }
}

// ============================================================================
// Wire envelope
// ============================================================================

/// Provider JSON envelope: `{status, data, message?, code?}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Which port a listing request targets — raw provider id or UN/LOCODE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelector {
    Id(String),
    Locode(String),
}

/// HTTP client for the upstream AIS provider.
#[derive(Debug)]
pub struct AisClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    cache: Arc<ResponseCache>,
    ttls: CacheTtls,
}

impl AisClient {
    /// Build a client. Fails hard when the credential is absent — a
    /// gateway without upstream access has nothing to serve.
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        cache: Arc<ResponseCache>,
        ttls: CacheTtls,
    ) -> Result<Self, UpstreamError> {
        if api_key.is_empty() {
            return Err(UpstreamError::MissingCredential(
                crate::config::defaults::API_KEY_ENV,
            ));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            cache,
            ttls,
        })
    }

    /// Issue an authenticated GET, or satisfy it from the cache.
    ///
    /// The cache key is deterministic over (path, sorted params). A live
    /// entry short-circuits the network entirely; on success the unwrapped
    /// envelope `data` is cached when `ttl > 0` and returned.
    pub async fn request(
        &self,
        path: &str,
        params: &[(&str, String)],
        ttl: Duration,
    ) -> Result<Value, UpstreamError> {
        let key = cache_key(path, params);
        if let Some(hit) = self.cache.lookup(&key).await {
            trace!(key = %key, "upstream cache hit");
            return Ok(hit);
        }

        let url = format!("{}{}", self.base_url, path);
        debug!(path = %path, "upstream request");
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::ServerError(status));
        }

        let body = resp.bytes().await?;
        let envelope: Envelope = serde_json::from_slice(&body)?;
        if envelope.status != "success" {
            return Err(UpstreamError::Envelope {
                code: envelope.code.unwrap_or_else(|| "unknown".to_string()),
                message: envelope
                    .message
                    .unwrap_or_else(|| "upstream request failed".to_string()),
            });
        }

        self.cache.store(key, envelope.data.clone(), ttl).await;
        Ok(envelope.data)
    }

    // ------------------------------------------------------------------
    // Typed endpoint wrappers
    // ------------------------------------------------------------------

    /// Live status of a single vessel. Never cached — status is the one
    /// field users check live.
    pub async fn vessel_status(&self, mmsi: &str) -> Result<Value, UpstreamError> {
        self.request(
            VESSEL_STATUS,
            &[("mmsi", mmsi.to_string())],
            self.ttls.status,
        )
        .await
    }

    /// All vessels reporting inside a bounding box within the query window.
    pub async fn vessel_zone(&self, zone: &ZoneQuery) -> Result<Vec<ZoneVessel>, UpstreamError> {
        let b = &zone.bbox;
        let params = [
            ("minlat", format!("{:.6}", b.min_lat)),
            ("maxlat", format!("{:.6}", b.max_lat)),
            ("minlon", format!("{:.6}", b.min_lon)),
            ("maxlon", format!("{:.6}", b.max_lon)),
            ("timespan", zone.minutes_back.to_string()),
            (
                "msgtype",
                if zone.extended { "extended" } else { "simple" }.to_string(),
            ),
        ];
        let data = self.request(VESSEL_ZONE, &params, self.ttls.zone).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Position history of a single vessel over the query window.
    pub async fn vessel_track(
        &self,
        mmsi: &str,
        minutes_back: u32,
    ) -> Result<Value, UpstreamError> {
        self.request(
            VESSEL_TRACK,
            &[
                ("mmsi", mmsi.to_string()),
                ("timespan", minutes_back.to_string()),
            ],
            self.ttls.zone,
        )
        .await
    }

    /// Free-form vessel search by name.
    pub async fn vessel_search(&self, name: &str) -> Result<Value, UpstreamError> {
        self.request(
            VESSEL_SEARCH,
            &[("name", name.to_string())],
            self.ttls.search,
        )
        .await
    }

    /// Batched live status for a list of MMSIs. Requested in extended
    /// verbosity so the voyage metadata needed by the port merge is present.
    pub async fn vessel_bulk(&self, mmsis: &[String]) -> Result<Vec<ZoneVessel>, UpstreamError> {
        let params = [
            ("mmsi", mmsis.join(",")),
            ("msgtype", "extended".to_string()),
        ];
        let data = self.request(VESSEL_BULK, &params, self.ttls.zone).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Free-form port search by name.
    pub async fn port_search(&self, name: &str) -> Result<Vec<PortRecord>, UpstreamError> {
        let data = self
            .request(PORT_SEARCH, &[("name", name.to_string())], self.ttls.search)
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Vessels currently in a port.
    pub async fn port_vessels(
        &self,
        selector: &PortSelector,
    ) -> Result<Vec<PortVessel>, UpstreamError> {
        let params = match selector {
            PortSelector::Id(id) => [("portid", id.clone())],
            PortSelector::Locode(code) => [("locode", code.clone())],
        };
        let data = self.request(PORT_VESSELS, &params, self.ttls.port).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Number of entries currently in the response cache.
    pub async fn cache_entries(&self) -> usize {
        self.cache.len().await
    }
}

// ============================================================================
// Planner-facing seam
// ============================================================================

/// The subset of upstream operations the query planner consumes.
///
/// The planner holds `Arc<dyn AisBackend>` so tests can drive it with an
/// in-memory fake and count calls without a network.
#[async_trait]
pub trait AisBackend: Send + Sync {
    async fn zone_vessels(&self, zone: &ZoneQuery) -> Result<Vec<ZoneVessel>, UpstreamError>;
    async fn bulk_status(&self, mmsis: &[String]) -> Result<Vec<ZoneVessel>, UpstreamError>;
    async fn find_ports(&self, name: &str) -> Result<Vec<PortRecord>, UpstreamError>;
    async fn vessels_in_port(
        &self,
        selector: &PortSelector,
    ) -> Result<Vec<PortVessel>, UpstreamError>;
}

#[async_trait]
impl AisBackend for AisClient {
    async fn zone_vessels(&self, zone: &ZoneQuery) -> Result<Vec<ZoneVessel>, UpstreamError> {
        self.vessel_zone(zone).await
    }

    async fn bulk_status(&self, mmsis: &[String]) -> Result<Vec<ZoneVessel>, UpstreamError> {
        self.vessel_bulk(mmsis).await
    }

    async fn find_ports(&self, name: &str) -> Result<Vec<PortRecord>, UpstreamError> {
        self.port_search(name).await
    }

    async fn vessels_in_port(
        &self,
        selector: &PortSelector,
    ) -> Result<Vec<PortVessel>, UpstreamError> {
        self.port_vessels(selector).await
    }
}
