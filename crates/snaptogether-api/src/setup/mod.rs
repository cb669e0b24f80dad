//! Startup sequence: validate config, install logging, register describers, build the router

pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::{AppState, CredentialSource};
use anyhow::{Context, Result};
use snaptogether_core::Config;
use std::sync::Arc;

/// Build the shared state and the router for `config`
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        provider = %config.provider(),
        mode = %config.generation_mode(),
        "Configuration loaded and validated successfully"
    );

    // Register describers and select the configured provider
    let state = services::initialize_services(&config, CredentialSource::Environment).await?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
