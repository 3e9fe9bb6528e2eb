use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use mediashelf_core::models::MediaListing;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse {
    pub success: bool,
    #[serde(flatten)]
    pub listing: MediaListing,
}

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "media",
    responses(
        (status = 200, description = "Merged media library, newest first", body = ListResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_media"))]
pub async fn list_media(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let listing = state.media.list().await?;

    Ok((
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(ListResponse {
            success: true,
            listing,
        }),
    ))
}
