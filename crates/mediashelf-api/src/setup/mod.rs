//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use mediashelf_core::Config;
use mediashelf_services::{MediaRegistryService, MediaValidator, OEmbedExtractor};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        backend = %config.storage_backend(),
        "Configuration loaded and validated successfully"
    );

    let (backend, registry) = storage::setup_storage(&config).await?;
    let links = Arc::new(OEmbedExtractor::new(config.oembed_endpoint())?);

    let media = MediaRegistryService::new(
        backend,
        registry,
        links,
        MediaValidator::from_config(&config),
    );
    let state = AppState::new(config.clone(), media);

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
