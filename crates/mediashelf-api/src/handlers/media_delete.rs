use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use mediashelf_core::models::DeleteReport;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: DeleteReport,
}

#[utoipa::path(
    delete,
    path = "/api/videos/{filename}",
    tag = "media",
    params(
        ("filename" = String, Path, description = "Logical filename, optionally percent-encoded")
    ),
    responses(
        (status = 200, description = "Delete processed; flags report what changed", body = DeleteResponse),
        (status = 400, description = "Reserved or empty filename", body = ErrorResponse),
        (status = 503, description = "Storage or registry unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_media"))]
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    let report = state.media.delete(&filename).await?;

    if !report.storage_deleted && report.metadata_cleaned {
        tracing::info!(filename = %report.filename, "Removed metadata for a file already gone from storage");
    }

    Ok(Json(DeleteResponse {
        success: true,
        report,
    }))
}
