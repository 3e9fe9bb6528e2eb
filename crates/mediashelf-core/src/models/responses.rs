use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::media::MediaKind;

/// One item in the merged library listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntry {
    /// Logical filename (or registry key for external links)
    pub filename: String,
    /// Where the bytes (or the external page) can be fetched
    pub url: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(rename = "mediaUrl", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(rename = "youtubeUrl", skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MediaListing {
    pub media: Vec<MediaEntry>,
    pub count: usize,
    /// True when the metadata registry could not be read and entries carry
    /// derived titles only.
    pub degraded: bool,
}

/// Outcome of a multi-file upload; at least one file was stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadReport {
    pub uploaded: usize,
    /// Logical names of the stored files
    pub files: Vec<String>,
    /// `"{original name}: {reason}"` per rejected file
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl UploadReport {
    /// Some files were stored and some were rejected.
    pub fn is_partial(&self) -> bool {
        self.uploaded > 0 && !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReport {
    pub filename: String,
    pub storage_deleted: bool,
    pub metadata_cleaned: bool,
    pub records_removed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    pub filename: String,
    pub url: String,
    pub size: u64,
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkRegistration {
    /// Registry key the link was stored under
    pub key: String,
    pub title: String,
    pub author: Option<String>,
    pub thumbnail_url: Option<String>,
    pub external_url: String,
}
