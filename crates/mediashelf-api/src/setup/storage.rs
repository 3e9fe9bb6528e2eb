//! Blob backend and registry store construction

use anyhow::{Context, Result};
use mediashelf_core::Config;
use mediashelf_services::{create_backend, create_registry_store, BlobBackend, RegistryStore};
use std::sync::Arc;

/// Build the configured blob backend and the registry store that lives on it.
pub async fn setup_storage(
    config: &Config,
) -> Result<(Arc<dyn BlobBackend>, Arc<dyn RegistryStore>)> {
    let backend = create_backend(config)
        .await
        .context("Failed to initialize storage backend")?;
    let registry = create_registry_store(config, backend.clone());

    tracing::info!(
        backend = %backend.backend_type(),
        registry_document = %registry.document_name(),
        "Storage initialized"
    );

    Ok((backend, registry))
}
