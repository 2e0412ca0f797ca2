//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_tracing().context("Failed to initialize tracing")?;

    tracing::info!(
        environment = %config.base.environment,
        storage_backend = %config.storage_backend,
        "Configuration loaded and validated"
    );

    tracing::info!("Connecting to database...");
    let pool = tubely_db::connect(&config)
        .await
        .context("Failed to set up database")?;
    tracing::info!(
        max_connections = config.base.db_max_connections,
        "Database connected and migrations applied"
    );

    let storage = tubely_storage::create_storage(&config)
        .await
        .context("Failed to set up storage")?;

    let state = services::initialize_services(&config, pool, storage)?;
    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
