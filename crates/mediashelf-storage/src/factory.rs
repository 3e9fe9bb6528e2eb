#[cfg(feature = "storage-local")]
use crate::LocalBlobStorage;
#[cfg(feature = "storage-remote")]
use crate::RemoteBlobStorage;
use crate::{BlobBackend, StorageBackend, StorageError, StorageResult};
use mediashelf_core::Config;
use std::sync::Arc;

/// Create a blob backend based on configuration
pub async fn create_backend(config: &Config) -> StorageResult<Arc<dyn BlobBackend>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-remote")]
        StorageBackend::Remote => {
            let base_url = config.remote_storage_url().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("REMOTE_STORAGE_URL not configured".to_string())
            })?;
            let token = config
                .remote_storage_token()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("REMOTE_STORAGE_TOKEN not configured".to_string())
                })?;

            let storage = RemoteBlobStorage::new(base_url, token, config.remote_list_page_size())?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-remote"))]
        StorageBackend::Remote => Err(StorageError::ConfigError(
            "Remote storage backend not available (storage-remote feature not enabled)"
                .to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config
                .local_storage_path()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
                })?;
            let base_url = config
                .local_storage_base_url()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
                })?;

            let storage = LocalBlobStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local", feature = "storage-remote"))]
mod tests {
    use super::*;
    use mediashelf_core::MediaShelfConfig;

    #[tokio::test]
    async fn test_creates_local_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config(Box::new(MediaShelfConfig {
            local_storage_path: Some(dir.path().to_string_lossy().into_owned()),
            ..Default::default()
        }));

        let backend = create_backend(&config).await.unwrap();
        assert_eq!(backend.backend_type(), StorageBackend::Local);
    }

    #[tokio::test]
    async fn test_remote_backend_requires_token() {
        let config = Config(Box::new(MediaShelfConfig {
            storage_backend: StorageBackend::Remote,
            remote_storage_url: Some("https://blob.example.com".to_string()),
            ..Default::default()
        }));

        assert!(matches!(
            create_backend(&config).await,
            Err(StorageError::ConfigError(_))
        ));
    }
}
