use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clim_db::DbClient;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Observability
    clim_obs::init("climd");

    // Config
    let cfg = clim_config::AppConfig::load().context("Failed to load configuration")?;
    let database_url = cfg.database_url();

    // Store
    let client = DbClient::new(&database_url, cfg.max_connections())
        .await
        .with_context(|| format!("Failed to open database {database_url}"))?;
    client.ping().await.context("Database ping failed")?;
    tracing::info!(%database_url, "Connected to database");

    let (app, state) = clim_api::build_app(Arc::new(client), cfg.most_active_station());

    let addr: SocketAddr = cfg
        .http_bind()
        .parse()
        .context("Invalid HTTP bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;

    // Mark ready just before serving
    clim_api::set_ready(&state, true);

    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
