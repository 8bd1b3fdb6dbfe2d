//! rollcall-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use rollcall_gateway::api;
use rollcall_gateway::app_state::AppState;
use rollcall_gateway::config::GatewayConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(
        addr = %config.listen_addr,
        upstream = %config.upstream_base_url,
        poll_interval_ms = config.poll_interval_ms,
        "starting rollcall-gateway"
    );

    // Build upstream, sync and service layers
    let app_state = AppState::from_config(&config)?;

    if let Some(event_name) = &config.default_event_name {
        let status = app_state.service.select_filter(event_name, None).await?;
        tracing::info!(filter = ?status.filter, "default filter selected");
    }

    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
