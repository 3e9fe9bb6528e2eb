use std::time::Instant;

use mediashelf_core::models::DeleteReport;
use mediashelf_core::AppError;
use mediashelf_storage::DeleteOutcome;

use super::MediaRegistryService;
use crate::resolver::resolve;

impl MediaRegistryService {
    /// Delete the stored object a name resolves to and every registry record
    /// filed under the requested or resolved name.
    ///
    /// Both halves are idempotent; the report says which of them changed
    /// anything. A storage failure aborts before the registry is touched.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, filename: &str) -> Result<DeleteReport, AppError> {
        let (raw, decoded) = self.requested_names(filename)?;

        let objects = self.physical_objects().await?;
        let resolved = resolve(&objects, &decoded)
            .or_else(|| resolve(&objects, &raw))
            .cloned();

        let storage_deleted = match &resolved {
            Some(object) => {
                let start = Instant::now();
                let outcome = self.backend.delete(&object.locator).await?;
                tracing::info!(
                    physical = %object.base_name(),
                    outcome = ?outcome,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Stored object deleted"
                );
                outcome == DeleteOutcome::Deleted
            }
            None => {
                tracing::info!(filename = %decoded, "No stored object for delete request");
                false
            }
        };

        let physical = resolved.as_ref().map(|object| object.base_name().to_string());
        let records_removed = self
            .registry
            .update(|registry| {
                let mut names = vec![raw.as_str(), decoded.as_str()];
                if let Some(physical) = physical.as_deref() {
                    names.push(physical);
                }
                registry.remove_matching(&names)
            })
            .await?;

        Ok(DeleteReport {
            filename: decoded,
            storage_deleted,
            metadata_cleaned: records_removed > 0,
            records_removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::registry::{Registry, RegistryStore};
    use chrono::Utc;
    use mediashelf_core::models::{MediaKind, MediaRecord};
    use mediashelf_core::AppError;
    use mediashelf_storage::MemoryBlobStorage;

    fn record(name: &str) -> MediaRecord {
        MediaRecord::uploaded(name, MediaKind::Video, "Clip", None, Utc::now())
    }

    async fn seed(fx: &Fixture, keys: &[(&str, &str)]) {
        let mut registry = Registry::default();
        for (key, filename) in keys {
            registry.insert(*key, record(filename));
        }
        fx.store.save(&registry).await.unwrap();
    }

    #[tokio::test]
    async fn test_deletes_object_and_record() {
        let fx = fixture();
        fx.backend
            .insert("video_abc123.mp4", &b"1"[..], Utc::now());
        seed(&fx, &[("video_abc123.mp4", "video_abc123.mp4")]).await;

        let report = fx.service.delete("video_abc123.mp4").await.unwrap();

        assert!(report.storage_deleted);
        assert!(report.metadata_cleaned);
        assert_eq!(report.records_removed, 1);
        assert!(!fx.backend.contains("video_abc123.mp4"));
        assert!(fx.store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_missing_object_still_cleans_metadata() {
        let fx = fixture();
        seed(&fx, &[("video_abc123.mp4", "video_abc123.mp4")]).await;

        let report = fx.service.delete("video_abc123.mp4").await.unwrap();

        assert!(!report.storage_deleted);
        assert!(report.metadata_cleaned);
    }

    #[tokio::test]
    async fn test_duplicate_records_are_all_removed() {
        let fx = fixture();
        fx.backend.insert("my clip.mp4", &b"1"[..], Utc::now());
        seed(
            &fx,
            &[
                ("my clip.mp4", "my clip.mp4"),
                ("my%20clip.mp4", "my%20clip.mp4"),
                ("legacy", "my clip.mp4"),
                ("other.mp4", "other.mp4"),
            ],
        )
        .await;

        let report = fx.service.delete("my%20clip.mp4").await.unwrap();

        assert_eq!(report.filename, "my clip.mp4");
        assert!(report.storage_deleted);
        assert_eq!(report.records_removed, 3);
        assert_eq!(fx.store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_suffixed_object_and_its_record_are_removed() {
        let fx = fixture_with(MemoryBlobStorage::with_random_suffix(), StubExtractor::default());
        let report = fx
            .service
            .upload(vec![file("clip.mp4", "video/mp4", b"1")], None)
            .await
            .unwrap();
        let stored = report.files[0].clone();
        let logical = crate::resolver::logical_name(&stored);

        let deleted = fx.service.delete(&logical).await.unwrap();

        assert!(deleted.storage_deleted);
        assert_eq!(deleted.records_removed, 1);
        assert!(fx.backend.names().is_empty());
        assert!(fx.store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_nothing_to_delete_saves_nothing() {
        let fx = fixture();
        let report = fx.service.delete("ghost.mp4").await.unwrap();

        assert!(!report.storage_deleted);
        assert!(!report.metadata_cleaned);
        assert_eq!(fx.store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_registry_document_cannot_be_deleted() {
        let fx = fixture();
        fx.backend.insert("metadata.json", &b"{}"[..], Utc::now());

        assert!(matches!(
            fx.service.delete("metadata.json").await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            fx.service.delete("metadata%2Ejson").await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(fx.backend.contains("metadata.json"));
    }

    #[tokio::test]
    async fn test_unreadable_registry_is_reported_after_storage_delete() {
        let fx = fixture();
        fx.backend.insert("clip.mp4", &b"1"[..], Utc::now());
        fx.store.set_unavailable(true);

        assert!(matches!(
            fx.service.delete("clip.mp4").await,
            Err(AppError::BackendUnavailable(_))
        ));
        assert_eq!(fx.store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_registry_untouched() {
        let fx = fixture();
        seed(&fx, &[("clip.mp4", "clip.mp4")]).await;
        fx.backend.fail_listing(true);

        assert!(matches!(
            fx.service.delete("clip.mp4").await,
            Err(AppError::BackendUnavailable(_))
        ));
        assert_eq!(fx.store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_registry_save_failure_after_storage_delete() {
        let fx = fixture();
        fx.backend.insert("clip.mp4", &b"1"[..], Utc::now());
        seed(&fx, &[("clip.mp4", "clip.mp4")]).await;
        fx.store.fail_saves(true);

        assert!(matches!(
            fx.service.delete("clip.mp4").await,
            Err(AppError::BackendUnavailable(_))
        ));
        assert!(!fx.backend.contains("clip.mp4"));
        assert_eq!(fx.store.snapshot().len(), 1);

        // A retry finds no object but still cleans the stale record.
        fx.store.fail_saves(false);
        let report = fx.service.delete("clip.mp4").await.unwrap();
        assert!(!report.storage_deleted);
        assert!(report.metadata_cleaned);
    }
}
