//! Physical object model: what a storage backend reports about one stored object.

use chrono::{DateTime, Utc};

/// A stored object as listed by a backend.
///
/// `path` is the full backend path, `locator` is the handle accepted by
/// `get`/`download`/`delete` (a filesystem key locally, an object URL
/// remotely) and `url` is where a client can fetch the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalObject {
    pub path: String,
    pub locator: String,
    pub url: String,
    pub size: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

impl PhysicalObject {
    /// Final path segment of the object path.
    pub fn base_name(&self) -> &str {
        base_name(&self.path)
    }
}

/// Final path segment of a `/`-separated path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
