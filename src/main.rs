// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::{DEFAULT_CONFIG_PATH, load_dashboard_config};
use crate::infrastructure::file_store::FileStore;
use crate::infrastructure::http_rover_client::HttpRoverClient;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config_path =
        std::env::var("ROVER_DASHBOARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_dashboard_config(&config_path)?;

    // Create adapters (infrastructure layer)
    let store = Arc::new(
        FileStore::open(&config.storage.dir)
            .with_context(|| format!("opening storage directory {}", config.storage.dir))?,
    );
    let client = Arc::new(HttpRoverClient::new(config.poll.request_timeout())?);

    // Create services (application layer)
    let state = Arc::new(AppState::build(&config, store, client));
    state.dashboard.resume().await;

    // Build router (presentation layer)
    let app = router(state.clone());

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid server.bind address {}", config.server.bind))?;
    tracing::info!("Starting rover-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.poller.stop().await;
    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
