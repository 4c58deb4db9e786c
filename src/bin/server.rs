//! ha-bridge HTTP server binary.
//!
//! Loads the policy, probes the hub once and serves the tool registry over
//! HTTP.
//!
//! # Environment Variables
//!
//! - `PORT` - HTTP port (default: 8787)
//! - `HA_BRIDGE_CONFIG` - Path to a JSON/YAML config file. When unset the
//!   `HA_*` variables below are used instead.
//! - `HA_URL`, `HA_TOKEN` - Hub base URL and long-lived access token
//! - `HA_ALLOWED_DOMAINS` - Comma-separated domain allow-list
//! - `HA_READ_ONLY` - Block every write tool when `true`
//! - `HA_TIMEOUT_MS`, `HA_HISTORY_WINDOW_HOURS`
//! - `RUST_LOG` - Tracing filter (default: "info")
//!
//! # Usage
//!
//! ```bash
//! HA_URL=http://homeassistant.local:8123 HA_TOKEN=... cargo run --bin ha-bridge-server
//! ```

use std::sync::Arc;

use anyhow::Context;
use ha_bridge::client::{HubApi, HubClient};
use ha_bridge::config::{config_from_env, load_config_file, PolicyConfig};
use ha_bridge::server::{app_router, AppState};
use ha_bridge::tools::ToolRegistry;

fn load_config() -> ha_bridge::Result<PolicyConfig> {
    match std::env::var("HA_BRIDGE_CONFIG") {
        Ok(path) if !path.trim().is_empty() => load_config_file(path.trim()),
        _ => config_from_env(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ha_bridge=debug".into()),
        )
        .init();

    let config = load_config().context("Failed to load bridge configuration")?;
    tracing::info!(
        url = %config.url,
        read_only = config.read_only,
        allowed_domains = ?config.allowed_domains,
        "Policy loaded"
    );

    let client = Arc::new(HubClient::new(&config).context("Failed to build HTTP client")?);
    match client.check_connection().await {
        Ok(_) => tracing::info!("Connected to Home Assistant at {}", config.url),
        Err(e) => tracing::warn!("Home Assistant not reachable yet ({}): {}", e.kind(), e),
    }

    let registry = ToolRegistry::new(config, client);
    let app = app_router(AppState::new(registry));

    let port = std::env::var("PORT").unwrap_or_else(|_| "8787".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);

    tracing::info!("ha-bridge server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health       - liveness probe");
    tracing::info!("  GET  /tools        - operation catalogue");
    tracing::info!("  POST /tools/{{name}} - invoke an operation");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
