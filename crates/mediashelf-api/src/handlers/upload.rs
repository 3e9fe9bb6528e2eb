use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use mediashelf_core::models::UploadReport;
use mediashelf_services::IncomingFile;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

const MEDIA_FIELD: &str = "media";
const SOURCE_URL_FIELD: &str = "productUrl";

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: UploadReport,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "media",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Repeated `media` file fields and an optional `productUrl` text field"),
    responses(
        (status = 200, description = "At least one file stored", body = UploadResponse),
        (status = 400, description = "No file could be stored", body = ErrorResponse),
        (status = 503, description = "Storage or registry unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_media"))]
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let mut files = Vec::new();
    let mut source_url = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(MEDIA_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                files.push(IncomingFile {
                    filename,
                    content_type,
                    data,
                });
            }
            Some(SOURCE_URL_FIELD) => {
                source_url = Some(field.text().await?);
            }
            other => {
                tracing::debug!(field = ?other, "Ignoring unknown multipart field");
            }
        }
    }

    let report = state.media.upload(files, source_url).await?;
    if report.is_partial() {
        tracing::info!(
            uploaded = report.uploaded,
            rejected = report.errors.len(),
            "Upload partially succeeded"
        );
    }

    Ok(Json(UploadResponse {
        success: true,
        report,
    }))
}
