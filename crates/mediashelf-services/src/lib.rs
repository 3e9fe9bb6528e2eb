//! Mediashelf Services Layer
//!
//! This crate is the business service layer: filename resolution, the
//! metadata registry and its persistence, upload validation, external link
//! lookup, and the [`MediaRegistryService`] that coordinates them over a
//! blob backend. HTTP handling stays in mediashelf-api.

pub mod link;
pub mod media;
pub mod naming;
pub mod registry;
pub mod resolver;
pub mod validator;

pub use link::{LinkError, LinkMetadata, LinkMetadataExtractor, OEmbedExtractor, Thumbnail};
pub use media::{IncomingFile, MediaContent, MediaRegistryService, Readiness};
pub use mediashelf_storage::{
    create_backend, BlobBackend, LocalBlobStorage, MemoryBlobStorage, RemoteBlobStorage,
    StorageBackend, StorageError, StorageResult,
};
pub use registry::{
    create_registry_store, BlobRegistryStore, FileRegistryStore, MemoryRegistryStore, Registry,
    RegistryError, RegistryStore, RegistryWriter,
};
pub use validator::{MediaValidator, ValidationError};
