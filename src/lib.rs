//! Product Showcase - catalog storefront
//!
//! Serves a product catalog with category browsing, search and a password
//! protected admin panel. Products are added by scraping marketplace product
//! pages, by bulk importing a supplier's store page, or by hand. Page views
//! and order clicks are tracked for a small analytics dashboard.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod web;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::application::state::AppState;
use crate::infrastructure::config::ServerConfig;
use crate::infrastructure::database_connection::DatabaseConnection;

/// Open the database, build the router and serve until Ctrl-C
pub async fn serve(config: ServerConfig) -> Result<()> {
    let db = DatabaseConnection::new(&config.database_url()).await?;
    db.migrate().await?;

    let listen = config.listen.clone();
    let state = AppState::new(config, db.pool().clone())?;
    let app = web::build_router(state);

    let listener = TcpListener::bind(&listen)
        .await
        .with_context(|| format!("binding {listen}"))?;
    info!("🚀 Showcase listening on http://{}", listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
