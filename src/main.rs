//! WhaleSafe Gateway - Credit-Aware AIS Aggregation
//!
//! Aggregates third-party vessel-tracking (AIS) data behind a small HTTP
//! gateway and enriches it with whale-collision-risk scores for the map UI.
//!
//! # Usage
//!
//! ```bash
//! # Run with built-in defaults
//! WHALESAFE_AIS_API_KEY=... cargo run --release
//!
//! # Run with an explicit config file
//! WHALESAFE_AIS_API_KEY=... cargo run --release -- --config ./gateway_config.toml
//! ```
//!
//! # Environment Variables
//!
//! - `WHALESAFE_AIS_API_KEY`: upstream provider credential (required)
//! - `WHALESAFE_CONFIG`: path to a TOML config file
//! - `WHALESAFE_CORS_ORIGINS`: comma-separated dev CORS origins
//! - `RUST_LOG`: logging level (default: info)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use whalesafe_gateway::api::{create_app, GatewayState};
use whalesafe_gateway::config::{self, defaults, GatewayConfig};
use whalesafe_gateway::query::QueryPlanner;
use whalesafe_gateway::risk::RiskClient;
use whalesafe_gateway::upstream::{AisBackend, AisClient, CacheTtls, ResponseCache};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "whalesafe-gateway")]
#[command(about = "WhaleSafe credit-aware AIS aggregation gateway")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default from config, "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to a TOML config file (overrides the search order)
    #[arg(long)]
    config: Option<PathBuf>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    // Load gateway configuration
    let gateway_config = match &args.config {
        Some(path) => GatewayConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => GatewayConfig::load(),
    };
    config::init(gateway_config);
    let cfg = config::get();

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  WhaleSafe Gateway");
    info!("  Credit-Aware AIS Aggregation");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!(
        upstream = %cfg.upstream.base_url,
        max_results = cfg.query.max_results,
        "configuration loaded"
    );

    // Upstream client — fails hard without a credential.
    let api_key = std::env::var(defaults::API_KEY_ENV).unwrap_or_default();
    let cache = Arc::new(ResponseCache::new());
    let client = Arc::new(
        AisClient::new(
            &cfg.upstream.base_url,
            &api_key,
            Duration::from_secs(cfg.upstream.timeout_secs),
            cache,
            CacheTtls::from(&cfg.cache),
        )
        .context("upstream AIS client unavailable")?,
    );
    info!("✓ Upstream AIS client ready");

    // Optional risk-scoring client.
    let risk = match &cfg.risk.base_url {
        Some(url) => {
            let risk_client = Arc::new(
                RiskClient::new(url, Duration::from_secs(cfg.risk.timeout_secs))
                    .context("failed to build risk client")?,
            );
            if risk_client.health().await {
                info!(url = %url, "✓ Risk scoring service reachable");
            } else {
                warn!(url = %url, "Risk scoring service not responding — enrichment will degrade");
            }
            Some(risk_client)
        }
        None => {
            info!("Risk scoring not configured — serving un-enriched responses");
            None
        }
    };

    let backend: Arc<dyn AisBackend> = client.clone();
    let planner = Arc::new(QueryPlanner::new(backend));

    let state = GatewayState {
        planner,
        client,
        risk,
        started_at: Instant::now(),
    };
    let app = create_app(state);

    let addr = args.addr.unwrap_or_else(|| cfg.server.addr());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("✓ HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
