mod client;
mod config;
mod error;
mod handlers;
mod metrics;
mod relay;
mod routes;

#[cfg(test)]
mod handlers_tests;

use anyhow::Context;
use playground_common::config::RelayConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::client::PistonClient;
use crate::config::ServerSettings;
use crate::relay::Relay;

pub struct AppState {
    pub relay: Relay,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay,
            started_at: chrono::Utc::now(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .with_target(false)
        .init();

    info!("Playground relay booting...");

    let settings = ServerSettings::from_env()?;

    let relay_config = RelayConfig::load(&settings.relay_config_path)
        .context("Failed to load relay configuration")?;

    info!(
        compile_timeout_ms = relay_config.compile_timeout_ms,
        run_timeout_ms = relay_config.run_timeout_ms,
        memory_limit = relay_config.memory_limit,
        languages = ?relay_config.language_aliases.canonical_ids(),
        "Relay configured"
    );

    let backend = PistonClient::new(&relay_config)
        .context("Failed to build execution backend client")?;
    info!("Execution backend: {}", backend.url());

    let state = Arc::new(AppState::new(Relay::new(relay_config, Arc::new(backend))));

    if settings.cors_origins.is_empty() {
        warn!("CORS_ALLOWED_ORIGINS not set, accepting any origin");
    }
    let app = routes::app(state, &settings.cors_origins);

    let listener = TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.bind_addr))?;

    info!("HTTP server listening on {}", settings.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Relay shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    warn!("Received shutdown signal, finishing in-flight requests...");
}
