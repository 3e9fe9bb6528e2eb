use mediashelf_core::models::{
    MediaEntry, MediaKind, MediaListing, MediaRecord, PhysicalObject,
};
use mediashelf_core::AppError;

use super::MediaRegistryService;
use crate::naming::title_from_name;
use crate::registry::Registry;
use crate::resolver::{is_thumbnail_for, logical_name};

const LINK_TITLE: &str = "YouTube Video";
const LINK_DESCRIPTION: &str = "YouTube video";

impl MediaRegistryService {
    /// Merged view of stored media and external-link records, newest first.
    ///
    /// A storage listing failure fails the call. An unreadable registry
    /// yields a degraded listing with derived titles; nothing is saved.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<MediaListing, AppError> {
        let (objects, registry) = tokio::join!(self.physical_objects(), self.registry.load());
        let objects = objects?;

        let (registry, degraded) = match registry {
            Ok(registry) => (registry, false),
            Err(e) => {
                tracing::warn!(error = %e, "Registry unavailable; listing with derived metadata");
                (Registry::default(), true)
            }
        };

        let mut media: Vec<MediaEntry> = objects
            .iter()
            .filter(|object| self.validator.is_media(object.base_name()))
            .map(|object| self.stored_entry(object, &registry))
            .collect();

        media.extend(
            registry
                .external_links()
                .map(|(key, record)| link_entry(key, record, &objects)),
        );

        media.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));

        tracing::debug!(count = media.len(), degraded, "Media listed");

        Ok(MediaListing {
            count: media.len(),
            media,
            degraded,
        })
    }

    fn stored_entry(&self, object: &PhysicalObject, registry: &Registry) -> MediaEntry {
        let physical = object.base_name();
        let logical = logical_name(physical);

        let mut record = registry
            .get(&logical)
            .or_else(|| registry.get(physical))
            .filter(|record| !record.is_external_link())
            .cloned();

        if record.as_ref().and_then(MediaRecord::usable_title).is_none() {
            if let Some((key, related)) = registry.find_related(&logical) {
                tracing::debug!(physical = %physical, key = %key, "Matched record by related name");
                match record.as_mut() {
                    Some(record) => record.overlay(related),
                    None => record = Some(related.clone()),
                }
            }
        }

        let kind = record
            .as_ref()
            .and_then(|r| r.kind)
            .filter(|kind| *kind != MediaKind::ExternalLink)
            .unwrap_or_else(|| self.validator.kind_for(physical));

        let title = record
            .as_ref()
            .and_then(MediaRecord::usable_title)
            .map(str::to_string)
            .unwrap_or_else(|| title_from_name(&logical));

        let description = record
            .as_ref()
            .and_then(|r| r.description.clone())
            .unwrap_or_else(|| kind.default_description().to_string());

        MediaEntry {
            filename: logical,
            url: object.url.clone(),
            title,
            description,
            kind,
            size: Some(object.size),
            uploaded_at: record
                .as_ref()
                .and_then(|r| r.uploaded_at)
                .or(object.modified_at),
            source_url: record.as_ref().and_then(|r| r.source_url.clone()),
            external_url: None,
            thumbnail_url: None,
        }
    }
}

fn link_entry(key: &str, record: &MediaRecord, objects: &[PhysicalObject]) -> MediaEntry {
    let thumbnail = objects
        .iter()
        .find(|object| is_thumbnail_for(object.base_name(), key));

    let external_url = record.external_url.clone().unwrap_or_default();

    MediaEntry {
        filename: key.to_string(),
        url: external_url.clone(),
        title: record
            .usable_title()
            .map(str::to_string)
            .unwrap_or_else(|| LINK_TITLE.to_string()),
        description: record
            .description
            .clone()
            .unwrap_or_else(|| LINK_DESCRIPTION.to_string()),
        kind: MediaKind::ExternalLink,
        size: None,
        uploaded_at: record.uploaded_at,
        source_url: record.source_url.clone(),
        external_url: Some(external_url),
        thumbnail_url: thumbnail.map(|object| object.url.clone()),
    }
}
