//! Stacklens API Server
//!
//! HTTP API server for resolving website/technology search queries against
//! the crowd-sourced store.

use stacklens_api::{bootstrap, routes};
use stacklens_common::ErrorContext;
use stacklens_config::ApplicationConfig;
use std::net::SocketAddr;
use tracing::info;

type MainResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> MainResult {
    // Initialize environment (load .env, etc.)
    stacklens_common::initialize_environment();

    // Load configuration before tracing so the default level is available
    let config = ApplicationConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.telemetry.tracing_level)
            }),
        )
        .init();

    info!("Starting Stacklens API server...");
    config.validate()?;
    info!(
        database = %config.database.safe_connection_string(),
        "Configuration loaded"
    );

    // Wire up services and build the router
    let state = bootstrap::initialize_app_state(&config).await?;
    let app = routes::create_router(state, config.api.enable_docs);

    // Bind to address
    let addr: SocketAddr = config
        .api
        .bind_address()
        .parse()
        .context("invalid API bind address")?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
