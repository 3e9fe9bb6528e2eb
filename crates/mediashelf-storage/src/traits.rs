//! Blob backend abstraction
//!
//! This module defines the [`BlobBackend`] trait implemented by every storage
//! backend, plus the error and result types shared by them.

use crate::{PhysicalObject, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use mediashelf_core::AppError;
use std::fmt;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid object name: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => AppError::NotFound(format!("File not found: {}", name)),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            other => AppError::BackendUnavailable(other.to_string()),
        }
    }
}

/// Chunked object body
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// How a client obtains an object's bytes.
pub enum BlobContent {
    /// Bytes are streamed through this process.
    Stream { body: ByteStream, size: Option<u64> },
    /// Client should be redirected to a publicly readable URL.
    Redirect(String),
}

impl fmt::Debug for BlobContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobContent::Stream { size, .. } => {
                f.debug_struct("Stream").field("size", size).finish()
            }
            BlobContent::Redirect(url) => f.debug_tuple("Redirect").field(url).finish(),
        }
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The object was already gone.
    NotFound,
}

/// Blob backend abstraction
///
/// Backends expose a flat namespace of named objects. Listing always returns
/// the complete set of matching objects; backends that paginate internally
/// must follow every page before returning.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Store `data` under `name`, or under a disambiguated variant of it when
    /// the backend adds random suffixes. The returned object carries the name
    /// actually used.
    async fn put(&self, name: &str, data: Bytes, content_type: &str)
        -> StorageResult<PhysicalObject>;

    /// Store `data` under exactly `name`, replacing any previous object.
    async fn put_exact(
        &self,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<PhysicalObject>;

    /// Every object whose name starts with `prefix` (all objects for `None`).
    async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<PhysicalObject>>;

    /// Access handle for an object's bytes.
    async fn get(&self, locator: &str) -> StorageResult<BlobContent>;

    /// Read an object fully into memory.
    async fn download(&self, locator: &str) -> StorageResult<Bytes>;

    async fn delete(&self, locator: &str) -> StorageResult<DeleteOutcome>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
