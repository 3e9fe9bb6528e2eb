use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Registry, RegistryError, RegistryStore};

#[derive(Default)]
struct MemoryState {
    registry: Registry,
    unavailable: bool,
    fail_saves: bool,
    loads: usize,
    saves: usize,
}

/// In-process registry store.
///
/// `load` snapshots the document and then yields to the scheduler before
/// returning, like a real read would, so interleavings between concurrent
/// callers are observable.
#[derive(Default)]
pub struct MemoryRegistryStore {
    state: Mutex<MemoryState>,
    document_name: String,
}

impl MemoryRegistryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::default(),
            document_name: "metadata.json".to_string(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make loads fail as if the document were unreadable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    pub fn fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    pub fn snapshot(&self) -> Registry {
        self.lock().registry.clone()
    }

    pub fn load_count(&self) -> usize {
        self.lock().loads
    }

    pub fn save_count(&self) -> usize {
        self.lock().saves
    }
}

#[async_trait]
impl RegistryStore for MemoryRegistryStore {
    async fn load(&self) -> Result<Registry, RegistryError> {
        let snapshot = {
            let mut state = self.lock();
            state.loads += 1;
            if state.unavailable {
                return Err(RegistryError::Unavailable(
                    "simulated unreadable document".to_string(),
                ));
            }
            state.registry.clone()
        };
        tokio::task::yield_now().await;
        Ok(snapshot)
    }

    async fn save(&self, registry: &Registry) -> Result<(), RegistryError> {
        let mut state = self.lock();
        if state.fail_saves {
            return Err(RegistryError::SaveFailed("simulated write failure".to_string()));
        }
        state.saves += 1;
        state.registry = registry.clone();
        Ok(())
    }

    fn document_name(&self) -> &str {
        &self.document_name
    }
}
