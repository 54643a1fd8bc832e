//! Gateway Configuration - All query limits and cache TTLs as operator-tunable TOML values
//!
//! Every limit that guards upstream credit spend is a field in this module.
//! Each struct implements `Default` with the values from [`super::defaults`],
//! ensuring the gateway runs with no config file present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a gateway deployment.
///
/// Load with `GatewayConfig::load()` which searches:
/// 1. `$WHALESAFE_CONFIG` env var
/// 2. `./gateway_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Upstream AIS provider endpoint
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Query shaping limits (credit guards)
    #[serde(default)]
    pub query: QueryLimitsConfig,

    /// Per-endpoint cache TTLs
    #[serde(default)]
    pub cache: CacheTtlConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Whale-risk scoring service (optional)
    #[serde(default)]
    pub risk: RiskConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            query: QueryLimitsConfig::default(),
            cache: CacheTtlConfig::default(),
            server: ServerConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration using the standard search order:
    /// 1. `$WHALESAFE_CONFIG` environment variable
    /// 2. `./gateway_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_PATH_ENV) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded gateway config from WHALESAFE_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from WHALESAFE_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "WHALESAFE_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("gateway_config.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded gateway config from ./gateway_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./gateway_config.toml, using defaults");
                }
            }
        }

        info!("No gateway_config.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would disable the credit guards or
    /// produce nonsense upstream queries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.base_url.is_empty() || !self.upstream.base_url.starts_with("http") {
            return Err(ConfigError::Invalid(format!(
                "upstream.base_url must be an http(s) URL, got {:?}",
                self.upstream.base_url
            )));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "upstream.timeout_secs must be at least 1".into(),
            ));
        }
        if self.query.max_results == 0 {
            return Err(ConfigError::Invalid(
                "query.max_results must be at least 1".into(),
            ));
        }
        if self.query.max_port_vessels == 0 {
            return Err(ConfigError::Invalid(
                "query.max_port_vessels must be at least 1".into(),
            ));
        }
        if self.query.max_lat_span_deg <= 0.0 || self.query.max_lon_span_deg <= 0.0 {
            return Err(ConfigError::Invalid(
                "query.max_lat_span_deg and query.max_lon_span_deg must be positive".into(),
            ));
        }
        if self.query.max_minutes_back < defaults::MINUTES_BACK_FLOOR {
            return Err(ConfigError::Invalid(format!(
                "query.max_minutes_back must be at least the upstream floor of {}",
                defaults::MINUTES_BACK_FLOOR
            )));
        }
        if self.query.default_minutes_back < defaults::MINUTES_BACK_FLOOR
            || self.query.default_minutes_back > self.query.max_minutes_back
        {
            return Err(ConfigError::Invalid(format!(
                "query.default_minutes_back must be within [{}, {}]",
                defaults::MINUTES_BACK_FLOOR,
                self.query.max_minutes_back
            )));
        }
        if let Some(url) = &self.risk.base_url {
            if !url.starts_with("http") {
                return Err(ConfigError::Invalid(format!(
                    "risk.base_url must be an http(s) URL, got {url:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration loading / validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// Sections
// ============================================================================

/// Upstream AIS provider connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Versioned REST base, no trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.aistracker.io/v2".to_string()
}

const fn default_upstream_timeout() -> u64 {
    defaults::DEFAULT_UPSTREAM_TIMEOUT_SECS
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_upstream_timeout(),
        }
    }
}

/// Query shaping limits. These are the credit guards — every one bounds
/// how much a single gateway request can cost upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLimitsConfig {
    /// `timespan` used when the caller supplies none (minutes).
    #[serde(default = "default_minutes_back")]
    pub default_minutes_back: u32,

    /// Ceiling for caller-supplied `timespan` (minutes).
    #[serde(default = "default_max_minutes_back")]
    pub max_minutes_back: u32,

    /// Maximum latitude span of a single zone query (degrees).
    #[serde(default = "default_max_lat_span")]
    pub max_lat_span_deg: f64,

    /// Maximum longitude span of a single zone query (degrees).
    #[serde(default = "default_max_lon_span")]
    pub max_lon_span_deg: f64,

    /// Maximum vessels returned from any search mode.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Maximum vessels enriched with live status per port query.
    #[serde(default = "default_max_port_vessels")]
    pub max_port_vessels: usize,
}

const fn default_minutes_back() -> u32 {
    defaults::DEFAULT_MINUTES_BACK
}
const fn default_max_minutes_back() -> u32 {
    defaults::MINUTES_BACK_CEILING
}
const fn default_max_lat_span() -> f64 {
    defaults::DEFAULT_MAX_LAT_SPAN_DEG
}
const fn default_max_lon_span() -> f64 {
    defaults::DEFAULT_MAX_LON_SPAN_DEG
}
const fn default_max_results() -> usize {
    defaults::DEFAULT_MAX_RESULTS
}
const fn default_max_port_vessels() -> usize {
    defaults::DEFAULT_MAX_PORT_VESSELS
}

impl Default for QueryLimitsConfig {
    fn default() -> Self {
        Self {
            default_minutes_back: default_minutes_back(),
            max_minutes_back: default_max_minutes_back(),
            max_lat_span_deg: default_max_lat_span(),
            max_lon_span_deg: default_max_lon_span(),
            max_results: default_max_results(),
            max_port_vessels: default_max_port_vessels(),
        }
    }
}

/// Per-endpoint cache TTLs (seconds). A TTL of 0 disables caching for
/// that endpoint class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheTtlConfig {
    #[serde(default = "default_status_ttl")]
    pub status_ttl_secs: u64,
    #[serde(default = "default_zone_ttl")]
    pub zone_ttl_secs: u64,
    #[serde(default = "default_search_ttl")]
    pub search_ttl_secs: u64,
    #[serde(default = "default_port_ttl")]
    pub port_ttl_secs: u64,
}

const fn default_status_ttl() -> u64 {
    defaults::DEFAULT_STATUS_TTL_SECS
}
const fn default_zone_ttl() -> u64 {
    defaults::DEFAULT_ZONE_TTL_SECS
}
const fn default_search_ttl() -> u64 {
    defaults::DEFAULT_SEARCH_TTL_SECS
}
const fn default_port_ttl() -> u64 {
    defaults::DEFAULT_PORT_TTL_SECS
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            status_ttl_secs: default_status_ttl(),
            zone_ttl_secs: default_zone_ttl(),
            search_ttl_secs: default_search_ttl(),
            port_ttl_secs: default_port_ttl(),
        }
    }
}

/// HTTP server binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
const fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Socket address string for the listener.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Whale-risk scoring service. Absent `base_url` disables enrichment —
/// the gateway serves un-enriched responses rather than failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_risk_timeout")]
    pub timeout_secs: u64,
}

const fn default_risk_timeout() -> u64 {
    defaults::DEFAULT_RISK_TIMEOUT_SECS
}
