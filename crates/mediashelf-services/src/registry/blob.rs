use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use mediashelf_storage::{BlobBackend, StorageError};

use super::{Registry, RegistryError, RegistryStore};

/// Registry document kept as an exact-named object in a blob backend.
pub struct BlobRegistryStore {
    backend: Arc<dyn BlobBackend>,
    document_name: String,
}

impl BlobRegistryStore {
    pub fn new(backend: Arc<dyn BlobBackend>, document_name: impl Into<String>) -> Self {
        Self {
            backend,
            document_name: document_name.into(),
        }
    }
}

#[async_trait]
impl RegistryStore for BlobRegistryStore {
    async fn load(&self) -> Result<Registry, RegistryError> {
        let objects = self
            .backend
            .list(Some(&self.document_name))
            .await
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;

        let Some(document) = objects
            .iter()
            .find(|o| o.base_name() == self.document_name)
        else {
            return Ok(Registry::default());
        };

        match self.backend.download(&document.locator).await {
            Ok(bytes) => Registry::from_json(&bytes),
            // Deleted between list and download.
            Err(StorageError::NotFound(_)) => Ok(Registry::default()),
            Err(e) => Err(RegistryError::Unavailable(e.to_string())),
        }
    }

    async fn save(&self, registry: &Registry) -> Result<(), RegistryError> {
        let bytes = registry.to_json()?;
        self.backend
            .put_exact(&self.document_name, Bytes::from(bytes), "application/json")
            .await
            .map_err(|e| RegistryError::SaveFailed(e.to_string()))?;

        tracing::debug!(
            document = %self.document_name,
            records = registry.len(),
            "Registry saved"
        );
        Ok(())
    }

    fn document_name(&self) -> &str {
        &self.document_name
    }
}
