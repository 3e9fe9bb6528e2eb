//! In-process blob backend.
//!
//! Keeps objects in a map and can mimic the remote store's random-suffix
//! naming. Failure switches let callers exercise degraded paths.

use crate::keys;
use crate::traits::{BlobBackend, BlobContent, DeleteOutcome, StorageError, StorageResult};
use crate::{PhysicalObject, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct MemoryState {
    objects: BTreeMap<String, (Bytes, DateTime<Utc>)>,
    fail_list: bool,
    fail_puts: HashSet<String>,
    put_count: usize,
}

pub struct MemoryBlobStorage {
    state: Mutex<MemoryState>,
    base_url: String,
    random_suffix: bool,
}

impl Default for MemoryBlobStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStorage {
    /// Stores objects under their exact names.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            base_url: "/api/videos".to_string(),
            random_suffix: false,
        }
    }

    /// Appends `-<32 alphanumerics>` before the extension on `put`.
    pub fn with_random_suffix() -> Self {
        Self {
            random_suffix: true,
            base_url: "https://blob.test".to_string(),
            ..Self::new()
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed an object with a fixed timestamp.
    pub fn insert(&self, name: &str, data: impl Into<Bytes>, modified_at: DateTime<Utc>) {
        self.lock()
            .objects
            .insert(name.to_string(), (data.into(), modified_at));
    }

    /// Make every subsequent `list` fail.
    pub fn fail_listing(&self, fail: bool) {
        self.lock().fail_list = fail;
    }

    /// Make `put` fail for requested names starting with `prefix`.
    pub fn fail_puts_matching(&self, prefix: &str) {
        self.lock().fail_puts.insert(prefix.to_string());
    }

    pub fn names(&self) -> Vec<String> {
        self.lock().objects.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().objects.contains_key(name)
    }

    pub fn put_count(&self) -> usize {
        self.lock().put_count
    }

    fn stored_name(&self, name: &str) -> String {
        if !self.random_suffix {
            return name.to_string();
        }
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        match name.rfind('.') {
            Some(dot) if dot > 0 => format!("{}-{}{}", &name[..dot], suffix, &name[dot..]),
            _ => format!("{}-{}", name, suffix),
        }
    }

    fn describe(&self, name: &str, data: &Bytes, modified_at: DateTime<Utc>) -> PhysicalObject {
        PhysicalObject {
            path: name.to_string(),
            locator: name.to_string(),
            url: keys::join_url(&self.base_url, name),
            size: data.len() as u64,
            modified_at: Some(modified_at),
        }
    }

    fn store(&self, requested: &str, stored: String, data: Bytes) -> StorageResult<PhysicalObject> {
        keys::validate_name(requested)?;
        let mut state = self.lock();
        if state.fail_puts.iter().any(|p| requested.starts_with(p.as_str())) {
            return Err(StorageError::UploadFailed(format!(
                "{}: simulated failure",
                requested
            )));
        }
        let now = Utc::now();
        state.put_count += 1;
        let object = self.describe(&stored, &data, now);
        state.objects.insert(stored, (data, now));
        Ok(object)
    }
}

#[async_trait]
impl BlobBackend for MemoryBlobStorage {
    async fn put(
        &self,
        name: &str,
        data: Bytes,
        _content_type: &str,
    ) -> StorageResult<PhysicalObject> {
        let stored = self.stored_name(name);
        self.store(name, stored, data)
    }

    async fn put_exact(
        &self,
        name: &str,
        data: Bytes,
        _content_type: &str,
    ) -> StorageResult<PhysicalObject> {
        self.store(name, name.to_string(), data)
    }

    async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<PhysicalObject>> {
        let state = self.lock();
        if state.fail_list {
            return Err(StorageError::BackendError(
                "simulated listing failure".to_string(),
            ));
        }
        Ok(state
            .objects
            .iter()
            .filter(|(name, _)| prefix.map_or(true, |p| name.starts_with(p)))
            .map(|(name, (data, modified_at))| self.describe(name, data, *modified_at))
            .collect())
    }

    async fn get(&self, locator: &str) -> StorageResult<BlobContent> {
        let data = self.download(locator).await?;
        let size = Some(data.len() as u64);
        let body = futures::stream::once(async move { Ok::<_, StorageError>(data) });
        Ok(BlobContent::Stream {
            body: Box::pin(body),
            size,
        })
    }

    async fn download(&self, locator: &str) -> StorageResult<Bytes> {
        self.lock()
            .objects
            .get(locator)
            .map(|(data, _)| data.clone())
            .ok_or_else(|| StorageError::NotFound(locator.to_string()))
    }

    async fn delete(&self, locator: &str) -> StorageResult<DeleteOutcome> {
        Ok(match self.lock().objects.remove(locator) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        })
    }

    fn backend_type(&self) -> StorageBackend {
        if self.random_suffix {
            StorageBackend::Remote
        } else {
            StorageBackend::Local
        }
    }
}
