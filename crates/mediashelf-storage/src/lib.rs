//! Mediashelf Storage Library
//!
//! This crate provides the blob backend abstraction and its implementations:
//! a flat local directory and a remote HTTP blob store.
//!
//! # Object names
//!
//! Both backends keep a flat namespace. Names must not contain `/`, `\` or
//! `..`. The remote backend may append a `-<32 alphanumerics>` disambiguator
//! before the extension when storing; callers that need the original name
//! strip it back off.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-remote")]
pub mod remote;
pub mod traits;

// Re-export commonly used types
pub use factory::create_backend;
#[cfg(feature = "storage-local")]
pub use local::LocalBlobStorage;
pub use mediashelf_core::models::PhysicalObject;
pub use mediashelf_core::StorageBackend;
pub use memory::MemoryBlobStorage;
#[cfg(feature = "storage-remote")]
pub use remote::RemoteBlobStorage;
pub use traits::{BlobBackend, BlobContent, ByteStream, DeleteOutcome, StorageError, StorageResult};
