use std::sync::Arc;

use tokio::sync::Mutex;

use super::{Registry, RegistryError, RegistryStore};

/// Serializes every load-modify-save cycle against one store.
///
/// Each update reloads the document after taking the lock, so a mutation is
/// always applied to the latest saved state and concurrent updates cannot
/// overwrite each other. Only one process may write through a given store.
pub struct RegistryWriter {
    store: Arc<dyn RegistryStore>,
    lock: Mutex<()>,
}

impl RegistryWriter {
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn RegistryStore> {
        &self.store
    }

    /// Read-only load; does not wait for in-flight updates.
    pub async fn load(&self) -> Result<Registry, RegistryError> {
        self.store.load().await
    }

    /// Apply `mutate` to a fresh copy of the document and save it if it
    /// changed. An unreadable document aborts the update before `mutate` runs.
    pub async fn update<T, F>(&self, mutate: F) -> Result<T, RegistryError>
    where
        F: FnOnce(&mut Registry) -> T + Send,
        T: Send,
    {
        let _guard = self.lock.lock().await;

        let original = self.store.load().await?;
        let mut registry = original.clone();
        let result = mutate(&mut registry);

        if registry != original {
            self.store.save(&registry).await?;
        }

        Ok(result)
    }
}
