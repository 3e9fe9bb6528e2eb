use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Placeholder title written when nothing better can be derived.
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    /// Entry for media hosted elsewhere; stored under the `youtube` tag.
    #[serde(rename = "youtube")]
    ExternalLink,
}

impl MediaKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "video" => Some(MediaKind::Video),
            "audio" => Some(MediaKind::Audio),
            "youtube" | "external-link" => Some(MediaKind::ExternalLink),
            _ => None,
        }
    }

    /// Fallback description for files with no recorded description.
    pub fn default_description(&self) -> &'static str {
        match self {
            MediaKind::Audio => "Audio file",
            MediaKind::Video | MediaKind::ExternalLink => "Video file",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::ExternalLink => write!(f, "youtube"),
        }
    }
}

/// Descriptive metadata for one media item, keyed in the registry by
/// logical filename.
///
/// Field names match the persisted JSON document. Fields this type does not
/// know about are kept in `extra` and written back unchanged. `type` and
/// `uploadedAt` are parsed leniently; the persisted values are remembered and
/// written back verbatim unless the parsed field is changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireRecord", into = "WireRecord")]
pub struct MediaRecord {
    pub filename: String,
    /// `mediaUrl` on the wire
    pub source_url: Option<String>,
    /// `youtubeUrl` on the wire
    pub external_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<MediaKind>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub extra: BTreeMap<String, JsonValue>,
    persisted: PersistedValues,
}

/// `type` and `uploadedAt` exactly as read from the document.
#[derive(Debug, Clone, Default, PartialEq)]
struct PersistedValues {
    kind: Option<JsonValue>,
    uploaded_at: Option<JsonValue>,
}

#[derive(Serialize, Deserialize)]
struct WireRecord {
    #[serde(default)]
    filename: String,
    #[serde(rename = "mediaUrl", default, skip_serializing_if = "Option::is_none")]
    source_url: Option<String>,
    #[serde(rename = "youtubeUrl", default, skip_serializing_if = "Option::is_none")]
    external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    kind: Option<JsonValue>,
    #[serde(
        rename = "uploadedAt",
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    uploaded_at: Option<JsonValue>,
    #[serde(flatten)]
    extra: BTreeMap<String, JsonValue>,
}

/// `Some` for any present value, `null` included.
fn present_value<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}

impl From<WireRecord> for MediaRecord {
    fn from(wire: WireRecord) -> Self {
        MediaRecord {
            filename: wire.filename,
            source_url: wire.source_url,
            external_url: wire.external_url,
            title: wire.title,
            description: wire.description,
            kind: wire.kind.as_ref().and_then(parse_kind),
            uploaded_at: wire.uploaded_at.as_ref().and_then(parse_timestamp),
            extra: wire.extra,
            persisted: PersistedValues {
                kind: wire.kind,
                uploaded_at: wire.uploaded_at,
            },
        }
    }
}

impl From<MediaRecord> for WireRecord {
    fn from(record: MediaRecord) -> Self {
        let kind = match record.persisted.kind {
            Some(raw) if parse_kind(&raw) == record.kind => Some(raw),
            _ => record.kind.map(|kind| JsonValue::String(kind.to_string())),
        };
        let uploaded_at = match record.persisted.uploaded_at {
            Some(raw) if parse_timestamp(&raw) == record.uploaded_at => Some(raw),
            _ => record
                .uploaded_at
                .map(|at| JsonValue::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))),
        };

        WireRecord {
            filename: record.filename,
            source_url: record.source_url,
            external_url: record.external_url,
            title: record.title,
            description: record.description,
            kind,
            uploaded_at,
            extra: record.extra,
        }
    }
}

impl MediaRecord {
    fn new(filename: String, kind: MediaKind, title: String, uploaded_at: DateTime<Utc>) -> Self {
        MediaRecord {
            filename,
            source_url: None,
            external_url: None,
            title: Some(title),
            description: None,
            kind: Some(kind),
            uploaded_at: Some(uploaded_at),
            extra: BTreeMap::new(),
            persisted: PersistedValues::default(),
        }
    }

    /// Record for a file that was just written to storage.
    pub fn uploaded(
        filename: impl Into<String>,
        kind: MediaKind,
        title: impl Into<String>,
        source_url: Option<String>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        MediaRecord {
            source_url,
            ..Self::new(filename.into(), kind, title.into(), uploaded_at)
        }
    }

    /// Record describing media hosted at `external_url`.
    pub fn external_link(
        key: impl Into<String>,
        external_url: impl Into<String>,
        title: impl Into<String>,
        description: Option<String>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        MediaRecord {
            external_url: Some(external_url.into()),
            description,
            ..Self::new(key.into(), MediaKind::ExternalLink, title.into(), uploaded_at)
        }
    }

    pub fn is_external_link(&self) -> bool {
        self.kind == Some(MediaKind::ExternalLink)
    }

    /// A title that is present, non-blank and not the placeholder.
    pub fn usable_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty() && *title != UNTITLED)
    }

    /// Fills fields from `other` wherever it carries a value.
    pub fn overlay(&mut self, other: &MediaRecord) {
        if other.usable_title().is_some() {
            self.title = other.title.clone();
        }
        if other.description.is_some() {
            self.description = other.description.clone();
        }
        if other.source_url.is_some() {
            self.source_url = other.source_url.clone();
        }
        if other.uploaded_at.is_some() {
            self.uploaded_at = other.uploaded_at;
        }
        if other.kind.is_some() && !other.is_external_link() {
            self.kind = other.kind;
        }
    }
}

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// RFC 3339, RFC 2822, zone-less date-times (read as UTC), bare dates and
/// epoch milliseconds. Anything else is `None`.
fn parse_timestamp(value: &JsonValue) -> Option<DateTime<Utc>> {
    match value {
        JsonValue::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
                return Some(dt.with_timezone(&Utc));
            }
            NAIVE_TIMESTAMP_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })
                .map(|naive| naive.and_utc())
        }
        JsonValue::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

fn parse_kind(value: &JsonValue) -> Option<MediaKind> {
    value.as_str().and_then(MediaKind::from_tag)
}
