//! Metadata registry
//!
//! A single JSON document maps logical filenames to [`MediaRecord`]s. It is
//! loaded and saved whole through a [`RegistryStore`]. Stores do no
//! coordination of their own: two callers that each load, modify and save
//! can lose one another's writes. Go through [`RegistryWriter`] for every
//! mutation.

mod blob;
mod file;
mod memory;
mod writer;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use mediashelf_core::models::MediaRecord;
use mediashelf_core::{AppError, Config, StorageBackend};
use mediashelf_storage::BlobBackend;
use serde::{Deserialize, Serialize};

use crate::naming::split_extension;
use crate::resolver::stems_related;

pub use blob::BlobRegistryStore;
pub use file::FileRegistryStore;
pub use memory::MemoryRegistryStore;
pub use writer::RegistryWriter;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The document exists but could not be read or parsed, or the backend
    /// holding it could not be reached.
    #[error("Registry unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to save registry: {0}")]
    SaveFailed(String),
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        AppError::BackendUnavailable(err.to_string())
    }
}

/// The registry document: logical filename to record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    records: BTreeMap<String, MediaRecord>,
}

impl Registry {
    pub fn from_json(bytes: &[u8]) -> Result<Self, RegistryError> {
        serde_json::from_slice(bytes)
            .map_err(|e| RegistryError::Unavailable(format!("Malformed registry document: {}", e)))
    }

    pub fn to_json(&self) -> Result<Vec<u8>, RegistryError> {
        serde_json::to_vec_pretty(self).map_err(|e| RegistryError::SaveFailed(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&MediaRecord> {
        self.records.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, record: MediaRecord) -> Option<MediaRecord> {
        self.records.insert(key.into(), record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MediaRecord)> {
        self.records.iter()
    }

    pub fn external_links(&self) -> impl Iterator<Item = (&String, &MediaRecord)> {
        self.records.iter().filter(|(_, r)| r.is_external_link())
    }

    /// Remove every record whose key or `filename` field equals one of
    /// `names`. Returns how many were removed.
    pub fn remove_matching(&mut self, names: &[&str]) -> usize {
        let before = self.records.len();
        self.records.retain(|key, record| {
            !names
                .iter()
                .any(|name| key.as_str() == *name || record.filename == *name)
        });
        before - self.records.len()
    }

    /// A titled, non-link record whose key stem is related to the stem of
    /// `logical_name` (see [`stems_related`]).
    pub fn find_related(&self, logical_name: &str) -> Option<(&String, &MediaRecord)> {
        let (target, _) = split_extension(logical_name);
        self.records.iter().find(|(key, record)| {
            let (stem, _) = split_extension(key);
            !record.is_external_link()
                && record.usable_title().is_some()
                && stems_related(stem, target)
        })
    }
}

/// Persistence for the registry document.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Current document. A document that does not exist yet is an empty
    /// registry, not an error.
    async fn load(&self) -> Result<Registry, RegistryError>;

    /// Replace the stored document.
    async fn save(&self, registry: &Registry) -> Result<(), RegistryError>;

    /// Object name of the document; never treated as media.
    fn document_name(&self) -> &str;
}

/// Store matching the configured backend: a file beside the local objects,
/// or an exact-named object in the remote store.
pub fn create_registry_store(
    config: &Config,
    backend: Arc<dyn BlobBackend>,
) -> Arc<dyn RegistryStore> {
    let document = config.registry_document().to_string();
    match config.storage_backend() {
        StorageBackend::Local => {
            let dir = config.local_storage_path().unwrap_or(".");
            Arc::new(FileRegistryStore::new(Path::new(dir).join(&document)))
        }
        StorageBackend::Remote => Arc::new(BlobRegistryStore::new(backend, document)),
    }
}
