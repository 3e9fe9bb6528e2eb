//! Media registry service
//!
//! [`MediaRegistryService`] is the only component that touches both the blob
//! backend and the metadata registry. Operations live in sibling modules:
//! `upload`, `listing`, `delete` and `links`; lookups are here.

mod delete;
mod links;
mod listing;
mod upload;

use std::sync::Arc;

use bytes::Bytes;
use mediashelf_core::models::{MediaInfo, PhysicalObject};
use mediashelf_core::AppError;
use mediashelf_storage::{BlobBackend, BlobContent, ByteStream};
use percent_encoding::percent_decode_str;

use crate::link::LinkMetadataExtractor;
use crate::registry::{RegistryStore, RegistryWriter};
use crate::resolver::resolve;
use crate::validator::{content_type_for, MediaValidator};

/// One file from an upload request.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// How to deliver a media item to a client.
pub enum MediaContent {
    Redirect(String),
    Stream {
        body: ByteStream,
        content_type: &'static str,
        size: Option<u64>,
    },
}

impl std::fmt::Debug for MediaContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaContent::Redirect(url) => f.debug_tuple("Redirect").field(url).finish(),
            MediaContent::Stream {
                content_type, size, ..
            } => f
                .debug_struct("Stream")
                .field("content_type", content_type)
                .field("size", size)
                .finish(),
        }
    }
}

/// Dependency status for readiness probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub storage: bool,
    pub registry: bool,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.storage && self.registry
    }
}

pub struct MediaRegistryService {
    backend: Arc<dyn BlobBackend>,
    registry: RegistryWriter,
    links: Arc<dyn LinkMetadataExtractor>,
    validator: MediaValidator,
}

impl MediaRegistryService {
    pub fn new(
        backend: Arc<dyn BlobBackend>,
        registry: Arc<dyn RegistryStore>,
        links: Arc<dyn LinkMetadataExtractor>,
        validator: MediaValidator,
    ) -> Self {
        Self {
            backend,
            registry: RegistryWriter::new(registry),
            links,
            validator,
        }
    }

    pub fn backend(&self) -> &Arc<dyn BlobBackend> {
        &self.backend
    }

    pub fn validator(&self) -> &MediaValidator {
        &self.validator
    }

    fn document_name(&self) -> &str {
        self.registry.store().document_name()
    }

    /// Requested name as given and percent-decoded; rejects blanks and the
    /// registry document.
    fn requested_names(&self, raw: &str) -> Result<(String, String), AppError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::InvalidInput("Filename required".to_string()));
        }
        let decoded = percent_decode_str(raw)
            .decode_utf8()
            .map(|name| name.into_owned())
            .unwrap_or_else(|_| raw.to_string());

        let reserved = self.document_name();
        if raw.eq_ignore_ascii_case(reserved) || decoded.eq_ignore_ascii_case(reserved) {
            return Err(AppError::InvalidInput(format!(
                "{} is reserved",
                reserved
            )));
        }

        Ok((raw.to_string(), decoded))
    }

    /// Listing without the registry document and in-flight temp files.
    async fn physical_objects(&self) -> Result<Vec<PhysicalObject>, AppError> {
        let document = self.document_name().to_string();
        let mut objects = self.backend.list(None).await?;
        objects.retain(|o| {
            let name = o.base_name();
            name != document && !name.starts_with('.')
        });
        Ok(objects)
    }

    async fn resolve_object(&self, raw: &str, decoded: &str) -> Result<PhysicalObject, AppError> {
        let objects = self.physical_objects().await?;
        resolve(&objects, decoded)
            .or_else(|| resolve(&objects, raw))
            .cloned()
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    /// Size, timestamp and access URL of a stored file.
    #[tracing::instrument(skip(self))]
    pub async fn info(&self, filename: &str) -> Result<MediaInfo, AppError> {
        let (raw, decoded) = self.requested_names(filename)?;
        let object = self.resolve_object(&raw, &decoded).await?;

        Ok(MediaInfo {
            filename: decoded,
            url: object.url,
            size: object.size,
            uploaded_at: object.modified_at,
        })
    }

    /// Content for `filename`. External-link records redirect to their
    /// external URL unless `thumbnail` is set, in which case the stored
    /// object (the link's thumbnail) is returned.
    #[tracing::instrument(skip(self))]
    pub async fn get_media(&self, filename: &str, thumbnail: bool) -> Result<MediaContent, AppError> {
        let (raw, decoded) = self.requested_names(filename)?;

        if !thumbnail {
            match self.registry.load().await {
                Ok(registry) => {
                    let external = registry
                        .get(&decoded)
                        .filter(|record| record.is_external_link())
                        .and_then(|record| record.external_url.clone());
                    if let Some(url) = external {
                        return Ok(MediaContent::Redirect(url));
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Registry unavailable; serving from storage only");
                }
            }
        }

        let object = self.resolve_object(&raw, &decoded).await?;

        Ok(match self.backend.get(&object.locator).await? {
            BlobContent::Redirect(url) => MediaContent::Redirect(url),
            BlobContent::Stream { body, size } => MediaContent::Stream {
                body,
                content_type: content_type_for(object.base_name()),
                size,
            },
        })
    }

    pub async fn readiness(&self) -> Readiness {
        let storage = match self.backend.list(Some(self.document_name())).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Storage backend not ready");
                false
            }
        };
        let registry = match self.registry.load().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Registry not ready");
                false
            }
        };
        Readiness { storage, registry }
    }
}
