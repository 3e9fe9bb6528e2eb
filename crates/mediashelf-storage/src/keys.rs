//! Shared object-name rules for storage backends.
//!
//! Names live in a flat namespace: no separators, no parent references.

use crate::{StorageError, StorageResult};

/// Reject names that could escape the flat namespace.
pub fn validate_name(name: &str) -> StorageResult<()> {
    if name.trim().is_empty() {
        return Err(StorageError::InvalidKey(
            "Object name must not be empty".to_string(),
        ));
    }
    if name.contains("..") || name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(StorageError::InvalidKey(
            "Object name contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Public URL for `name` under `base_url`.
pub fn join_url(base_url: &str, name: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), name)
}

/// Hidden sibling name used while a write is in flight.
pub fn temp_name(name: &str) -> String {
    format!(".{}.{}.tmp", name, hex::encode(rand::random::<[u8; 6]>()))
}
