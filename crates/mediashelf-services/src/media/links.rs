use chrono::Utc;
use mediashelf_core::models::{LinkRegistration, MediaRecord};
use mediashelf_core::AppError;

use super::MediaRegistryService;
use crate::link::{is_supported_link, LinkMetadata};
use crate::naming::{link_key, thumbnail_name};

impl MediaRegistryService {
    /// Record an externally hosted video, storing its thumbnail when one
    /// can be fetched.
    #[tracing::instrument(skip(self))]
    pub async fn register_link(&self, url: &str) -> Result<LinkRegistration, AppError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::InvalidInput("URL is required".to_string()));
        }
        if !is_supported_link(url) {
            return Err(AppError::InvalidInput(
                "Only YouTube URLs are supported".to_string(),
            ));
        }

        let metadata = self
            .links
            .extract(url)
            .await
            .map_err(|e| AppError::LinkExtraction(e.to_string()))?;

        self.registry.load().await?;

        let stored_thumbnail = self.store_thumbnail(&metadata).await;
        let (key, thumbnail_url) = match stored_thumbnail {
            Some((name, url)) => (name, Some(url)),
            None => (link_key(), None),
        };

        let description = metadata
            .author_name
            .as_deref()
            .map(|author| format!("YouTube video by {}", author));
        let record = MediaRecord::external_link(
            key.clone(),
            url,
            metadata.title.clone(),
            description,
            Utc::now(),
        );

        self.registry
            .update(|registry| {
                registry.insert(key.clone(), record);
            })
            .await?;

        tracing::info!(key = %key, url = %url, "External link registered");

        Ok(LinkRegistration {
            key,
            title: metadata.title,
            author: metadata.author_name,
            thumbnail_url,
            external_url: url.to_string(),
        })
    }

    /// Stored name and URL of the link's thumbnail; failures are logged.
    async fn store_thumbnail(&self, metadata: &LinkMetadata) -> Option<(String, String)> {
        let source = metadata.thumbnail_url.as_deref()?;

        let thumbnail = match self.links.fetch_thumbnail(source).await {
            Ok(thumbnail) => thumbnail,
            Err(e) => {
                tracing::warn!(error = %e, "Continuing without thumbnail");
                return None;
            }
        };

        let name = thumbnail_name(&metadata.title, thumbnail.extension());
        match self
            .backend
            .put(&name, thumbnail.data, &thumbnail.content_type)
            .await
        {
            Ok(object) => Some((object.base_name().to_string(), object.url)),
            Err(e) => {
                tracing::warn!(error = %e, name = %name, "Failed to store thumbnail");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::MediaContent;
    use crate::link::{LinkMetadata, Thumbnail};
    use bytes::Bytes;
    use mediashelf_core::models::MediaKind;
    use mediashelf_core::AppError;
    use mediashelf_storage::MemoryBlobStorage;

    fn extractor(with_thumbnail: bool) -> StubExtractor {
        StubExtractor {
            metadata: Some(LinkMetadata {
                title: "Rust in 100 Seconds".to_string(),
                author_name: Some("Fireship".to_string()),
                thumbnail_url: Some("https://i.ytimg.com/vi/abc/hqdefault.jpg".to_string()),
            }),
            thumbnail: with_thumbnail.then(|| Thumbnail {
                data: Bytes::from_static(b"jpeg"),
                content_type: "image/jpeg".to_string(),
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_link_with_thumbnail_is_keyed_by_stored_thumbnail() {
        let fx = fixture_with(MemoryBlobStorage::new(), extractor(true));

        let registration = fx
            .service
            .register_link(" https://www.youtube.com/watch?v=abc ")
            .await
            .unwrap();

        assert!(registration.key.starts_with("Rust_in_100_Seconds_thumb_"));
        assert!(registration.key.ends_with(".jpg"));
        assert!(fx.backend.contains(&registration.key));
        assert_eq!(registration.external_url, "https://www.youtube.com/watch?v=abc");

        let saved = fx.store.snapshot();
        let record = saved.get(&registration.key).unwrap();
        assert_eq!(record.kind, Some(MediaKind::ExternalLink));
        assert_eq!(record.description.as_deref(), Some("YouTube video by Fireship"));

        let listing = fx.service.list().await.unwrap();
        assert_eq!(listing.count, 1);
        assert_eq!(listing.media[0].title, "Rust in 100 Seconds");
        assert!(listing.media[0].thumbnail_url.is_some());

        assert!(matches!(
            fx.service.get_media(&registration.key, false).await.unwrap(),
            MediaContent::Redirect(url) if url == "https://www.youtube.com/watch?v=abc"
        ));
    }

    #[tokio::test]
    async fn test_thumbnail_failure_is_not_fatal() {
        let fx = fixture_with(MemoryBlobStorage::new(), extractor(false));

        let registration = fx
            .service
            .register_link("https://youtu.be/abc")
            .await
            .unwrap();

        assert!(registration.key.starts_with("youtube_"));
        assert!(registration.thumbnail_url.is_none());
        assert!(fx.backend.names().is_empty());
        assert!(fx.store.snapshot().contains_key(&registration.key));
    }

    #[tokio::test]
    async fn test_unsupported_and_empty_urls_are_rejected_before_lookup() {
        let fx = fixture();
        for url in ["", "   ", "https://vimeo.com/1"] {
            assert!(matches!(
                fx.service.register_link(url).await,
                Err(AppError::InvalidInput(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_extractor_failure_maps_to_link_extraction() {
        let fx = fixture();
        assert!(matches!(
            fx.service.register_link("https://youtu.be/private").await,
            Err(AppError::LinkExtraction(_))
        ));
        assert_eq!(fx.store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_registry_stores_nothing() {
        let fx = fixture_with(MemoryBlobStorage::new(), extractor(true));
        fx.store.set_unavailable(true);

        assert!(matches!(
            fx.service.register_link("https://youtu.be/abc").await,
            Err(AppError::BackendUnavailable(_))
        ));
        assert_eq!(fx.backend.put_count(), 0);
    }

    #[tokio::test]
    async fn test_registry_save_failure_keeps_stored_thumbnail() {
        let fx = fixture_with(MemoryBlobStorage::new(), extractor(true));
        fx.store.fail_saves(true);

        assert!(matches!(
            fx.service.register_link("https://youtu.be/abc").await,
            Err(AppError::BackendUnavailable(_))
        ));
        assert_eq!(fx.backend.put_count(), 1);
        assert!(fx.store.snapshot().is_empty());
    }
}
