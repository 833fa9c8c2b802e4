use anyhow::Context;
use tracing::{info, warn};

use crate::app::{app, AppState, ServiceSettings};
use crate::config::config;
use crate::database::DatabaseManager;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let config = config();
    info!("Starting Admin Query API in {:?} mode", config.environment);
    if crate::is_development!() && config.database.url.is_none() {
        warn!("DATABASE_URL not set; documents live in memory and are lost on exit");
    }

    let db = DatabaseManager::new(&config.database);
    let state = AppState::new(db, ServiceSettings::from_config(config));

    let port = port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Admin Query API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
