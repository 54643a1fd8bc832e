//! Whale-Risk Client — HTTP client for the external collision-risk scorer.
//!
//! The scoring model runs as a separate service; this client is plain API
//! glue. A missing or down scorer degrades to responses without risk
//! fields, never to request failure.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Risk client errors.
#[derive(Debug, thiserror::Error)]
pub enum RiskError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("risk service returned status {0}")]
    ServerError(reqwest::StatusCode),
}

/// A single-point whale-collision risk prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub latitude: f64,
    pub longitude: f64,
    /// Strike probability in [0, 1].
    pub probability: f64,
    /// Service-assigned band: "low" / "medium" / "high".
    pub risk_level: String,
    #[serde(default)]
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
struct RiskRequest {
    latitude: f64,
    longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    month: Option<u32>,
}

/// HTTP client for the whale-risk scoring service.
pub struct RiskClient {
    http: reqwest::Client,
    base_url: String,
}

impl RiskClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RiskError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Score a single location. Month defaults to the current month on the
    /// service side.
    pub async fn point_risk(
        &self,
        latitude: f64,
        longitude: f64,
        month: Option<u32>,
    ) -> Result<RiskAssessment, RiskError> {
        let resp = self
            .http
            .post(format!("{}/api/whale-risk", self.base_url))
            .json(&RiskRequest {
                latitude,
                longitude,
                month,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(RiskError::ServerError(resp.status()));
        }
        Ok(resp.json().await?)
    }

    /// Score a location, degrading to `None` on any failure.
    pub async fn try_point_risk(
        &self,
        latitude: f64,
        longitude: f64,
        month: Option<u32>,
    ) -> Option<RiskAssessment> {
        match self.point_risk(latitude, longitude, month).await {
            Ok(assessment) => Some(assessment),
            Err(e) => {
                warn!(error = %e, "risk scoring unavailable, serving un-enriched response");
                None
            }
        }
    }

    /// Liveness probe against the scorer's `/health` endpoint.
    pub async fn health(&self) -> bool {
        match self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}
