use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{Registry, RegistryError, RegistryStore};

/// Registry document kept as a JSON file on local disk.
///
/// Saves write a hidden temp file in the same directory and rename it over
/// the document, so readers see either the old or the new version.
#[derive(Debug, Clone)]
pub struct FileRegistryStore {
    path: PathBuf,
    document_name: String,
}

impl FileRegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let document_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            document_name,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let suffix = hex::encode(rand::random::<[u8; 6]>());
        self.path
            .with_file_name(format!(".{}.{}.tmp", self.document_name, suffix))
    }
}

#[async_trait]
impl RegistryStore for FileRegistryStore {
    async fn load(&self) -> Result<Registry, RegistryError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Registry::from_json(&bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Registry::default()),
            Err(e) => Err(RegistryError::Unavailable(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, registry: &Registry) -> Result<(), RegistryError> {
        let bytes = registry.to_json()?;
        let temp_path = self.temp_path();
        let fail = |e: std::io::Error| {
            RegistryError::SaveFailed(format!("{}: {}", self.path.display(), e))
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(fail)?;
        }

        let result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path).await;
            return Err(fail(e));
        }

        tracing::debug!(
            path = %self.path.display(),
            records = registry.len(),
            "Registry saved"
        );
        Ok(())
    }

    fn document_name(&self) -> &str {
        &self.document_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mediashelf_core::models::{MediaKind, MediaRecord};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_document_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileRegistryStore::new(dir.path().join("metadata.json"));
        assert!(store.load().await.unwrap().is_empty());
        assert_eq!(store.document_name(), "metadata.json");
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = FileRegistryStore::new(dir.path().join("metadata.json"));

        let mut registry = Registry::default();
        registry.insert(
            "a.mp4",
            MediaRecord::uploaded("a.mp4", MediaKind::Video, "a", None, Utc::now()),
        );
        store.save(&registry).await.unwrap();

        assert_eq!(store.load().await.unwrap(), registry);

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, b"{ truncated").unwrap();

        let store = FileRegistryStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(RegistryError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_unreadable_document_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::create_dir(&path).unwrap();

        let store = FileRegistryStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(RegistryError::Unavailable(_))
        ));
    }
}
