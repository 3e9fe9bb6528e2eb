use crate::keys;
use crate::traits::{BlobBackend, BlobContent, DeleteOutcome, StorageError, StorageResult};
use crate::{PhysicalObject, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Flat-directory storage implementation
///
/// Every object is a regular file directly under `base_path`. Names starting
/// with `.` are reserved for in-flight writes and never listed.
#[derive(Clone)]
pub struct LocalBlobStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalBlobStorage {
    /// Create a new LocalBlobStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Directory holding the objects (e.g., "./public/uploads")
    /// * `base_url` - URL prefix under which objects are served (e.g., "/api/videos")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalBlobStorage {
            base_path,
            base_url,
        })
    }

    fn key_to_path(&self, name: &str) -> StorageResult<PathBuf> {
        keys::validate_name(name)?;
        Ok(self.base_path.join(name))
    }

    fn describe(&self, name: &str, meta: &std::fs::Metadata) -> PhysicalObject {
        PhysicalObject {
            path: name.to_string(),
            locator: name.to_string(),
            url: keys::join_url(&self.base_url, name),
            size: meta.len(),
            modified_at: meta.modified().ok().map(DateTime::<Utc>::from),
        }
    }

    /// Write to a hidden temp file, then rename over the target.
    async fn write_atomic(&self, name: &str, data: &[u8]) -> StorageResult<PhysicalObject> {
        let path = self.key_to_path(name)?;
        let temp_path = self.base_path.join(keys::temp_name(name));
        let start = std::time::Instant::now();

        let result = async {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.write_all(data).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.sync_all().await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to sync file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            fs::rename(&temp_path, &path).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to move file into place {}: {}",
                    path.display(),
                    e
                ))
            })
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        let meta = fs::metadata(&path).await?;

        tracing::info!(
            path = %path.display(),
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(self.describe(name, &meta))
    }
}

fn not_found_or(err: std::io::Error, name: &str, other: fn(String) -> StorageError) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::NotFound(name.to_string())
    } else {
        other(format!("{}: {}", name, err))
    }
}

#[async_trait]
impl BlobBackend for LocalBlobStorage {
    async fn put(
        &self,
        name: &str,
        data: Bytes,
        _content_type: &str,
    ) -> StorageResult<PhysicalObject> {
        self.write_atomic(name, &data).await
    }

    async fn put_exact(
        &self,
        name: &str,
        data: Bytes,
        _content_type: &str,
    ) -> StorageResult<PhysicalObject> {
        self.write_atomic(name, &data).await
    }

    async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<PhysicalObject>> {
        let mut entries = fs::read_dir(&self.base_path).await.map_err(|e| {
            StorageError::BackendError(format!(
                "Failed to read storage directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if let Some(prefix) = prefix {
                if !name.starts_with(prefix) {
                    continue;
                }
            }
            let meta = match entry.metadata().await {
                Ok(meta) if meta.is_file() => meta,
                Ok(_) => continue,
                // Removed between read_dir and stat.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            objects.push(self.describe(&name, &meta));
        }

        objects.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::debug!(
            count = objects.len(),
            prefix = prefix.unwrap_or(""),
            "Local storage list"
        );

        Ok(objects)
    }

    async fn get(&self, locator: &str) -> StorageResult<BlobContent> {
        let path = self.key_to_path(locator)?;

        let file = fs::File::open(&path)
            .await
            .map_err(|e| not_found_or(e, locator, StorageError::DownloadFailed))?;
        let size = file.metadata().await.ok().map(|meta| meta.len());

        let body = tokio_util::io::ReaderStream::new(file).map(|result| {
            result.map_err(|e| StorageError::DownloadFailed(format!("Failed to read chunk: {}", e)))
        });

        Ok(BlobContent::Stream {
            body: Box::pin(body),
            size,
        })
    }

    async fn download(&self, locator: &str) -> StorageResult<Bytes> {
        let path = self.key_to_path(locator)?;
        let data = fs::read(&path)
            .await
            .map_err(|e| not_found_or(e, locator, StorageError::DownloadFailed))?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, locator: &str) -> StorageResult<DeleteOutcome> {
        let path = self.key_to_path(locator)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Local storage delete successful");
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(DeleteOutcome::NotFound),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
