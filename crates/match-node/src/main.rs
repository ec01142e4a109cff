//! # Match Node
//!
//! Entry point of the match consensus engine.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging and metrics) from `MC_*` variables
//! 2. Load and validate `NodeConfig`
//! 3. Open the store, load the seed file, build the service
//! 4. Serve the HTTP gateway until Ctrl+C

use anyhow::{Context, Result};
use match_node::{build_router, AppState, NodeConfig, NodeContainer};
use match_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    let container = NodeContainer::build(&config).context("Failed to build node")?;
    let event_log = container.spawn_event_log();

    let state = AppState {
        api: container.service.clone(),
        identity: container.identity.clone(),
    };
    let router = build_router(state, &config.gateway);

    let listener = tokio::net::TcpListener::bind(config.gateway.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.gateway.bind_addr))?;

    info!("===========================================");
    info!("  Match Node v{}", match_node::VERSION);
    info!("===========================================");
    info!(addr = %config.gateway.bind_addr, backend = ?config.storage.backend, "Gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Initiating graceful shutdown...");
            }
        })
        .await
        .context("Gateway server failed")?;

    event_log.abort();
    info!("Shutdown complete");
    Ok(())
}
