use std::time::Instant;

use chrono::Utc;
use mediashelf_core::models::{MediaRecord, UploadReport};
use mediashelf_core::AppError;

use super::{IncomingFile, MediaRegistryService};
use crate::naming::{generate_storage_name, title_from_name};

impl MediaRegistryService {
    /// Validate and store each file independently, then commit one record
    /// per stored file in a single registry update.
    ///
    /// Fails only when the registry cannot be read (before anything is
    /// written) or when no file was stored.
    #[tracing::instrument(skip(self, files), fields(file_count = files.len()))]
    pub async fn upload(
        &self,
        files: Vec<IncomingFile>,
        source_url: Option<String>,
    ) -> Result<UploadReport, AppError> {
        if files.is_empty() {
            return Err(AppError::InvalidInput("No files provided".to_string()));
        }

        // Refuse to write objects whose records could not be committed.
        self.registry.load().await?;

        let source_url = source_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let mut staged = Vec::new();
        let mut errors = Vec::new();

        for file in files {
            let name = file.filename.clone();

            if let Err(e) =
                self.validator
                    .validate_all(&file.filename, &file.content_type, file.data.len())
            {
                tracing::debug!(filename = %name, error = %e, "Upload rejected");
                errors.push(format!("{}: {}", name, e));
                continue;
            }

            let storage_name = generate_storage_name(&file.filename);
            let content_type = if file.content_type.trim().is_empty() {
                "application/octet-stream"
            } else {
                file.content_type.as_str()
            };

            let start = Instant::now();
            match self.backend.put(&storage_name, file.data, content_type).await {
                Ok(object) => {
                    let stored = object.base_name().to_string();
                    tracing::info!(
                        filename = %name,
                        stored = %stored,
                        size = object.size,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Media stored"
                    );
                    let record = MediaRecord::uploaded(
                        stored.clone(),
                        self.validator.kind_for(&stored),
                        title_from_name(&storage_name),
                        source_url.clone(),
                        Utc::now(),
                    );
                    staged.push((stored, record));
                }
                Err(e) => {
                    tracing::warn!(filename = %name, error = %e, "Failed to store upload");
                    errors.push(format!("{}: Failed to save - {}", name, e));
                }
            }
        }

        if staged.is_empty() {
            return Err(AppError::NoFilesUploaded { errors });
        }

        let files: Vec<String> = staged.iter().map(|(key, _)| key.clone()).collect();
        self.registry
            .update(move |registry| {
                for (key, record) in staged {
                    registry.insert(key, record);
                }
            })
            .await?;

        tracing::info!(
            uploaded = files.len(),
            rejected = errors.len(),
            "Upload batch committed"
        );

        Ok(UploadReport {
            uploaded: files.len(),
            files,
            errors,
        })
    }
}
