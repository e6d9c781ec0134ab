//! qlens web server entry point.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use qlens_web::{AppState, Cli, Config, create_router, init_tracing};

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli).context("failed to load configuration")?;

    init_tracing(&config.logging).context("failed to initialize tracing")?;

    let bind_addr = config.bind_address()?;
    tracing::info!(
        max_qubits = config.simulation.max_qubits,
        optimization_level = config.simulation.optimization_level,
        session_capacity = config.sessions.capacity,
        "configuration loaded"
    );

    let state = Arc::new(AppState::with_config(config));

    // Drop expired sessions in the background
    let purge_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let removed = purge_state.sessions.purge_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "purged expired sessions");
            }
        }
    });

    let app = create_router(state);

    tracing::info!("Starting qlens at http://{}", bind_addr);
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
