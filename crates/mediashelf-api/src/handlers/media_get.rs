use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::{DateTime, Utc};
use mediashelf_services::MediaContent;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize)]
pub struct GetMediaQuery {
    /// Serve the stored thumbnail of an external link instead of redirecting
    #[serde(default)]
    pub thumb: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfoResponse {
    pub success: bool,
    pub filename: String,
    /// Direct access URL reported by the backend
    pub url: String,
    /// URL of this API's serving endpoint for the file
    pub api_url: String,
    pub size: u64,
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[utoipa::path(
    get,
    path = "/api/videos/{filename}",
    tag = "media",
    params(
        ("filename" = String, Path, description = "Logical filename, optionally percent-encoded"),
        ("thumb" = Option<bool>, Query, description = "Serve an external link's stored thumbnail")
    ),
    responses(
        (status = 200, description = "Media bytes"),
        (status = 307, description = "Redirect to an external or remote URL"),
        (status = 404, description = "No stored object matches", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_media"))]
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    Query(query): Query<GetMediaQuery>,
) -> Result<Response, HttpAppError> {
    match state.media.get_media(&filename, query.thumb).await? {
        MediaContent::Redirect(url) => Ok(Redirect::temporary(&url).into_response()),
        MediaContent::Stream {
            body,
            content_type,
            size,
        } => {
            let mut response = Body::from_stream(body).into_response();
            let headers = response.headers_mut();
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
            headers.insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=3600"),
            );
            if let Some(size) = size {
                headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
            }
            Ok(response)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/videos/{filename}/info",
    tag = "media",
    params(
        ("filename" = String, Path, description = "Logical filename, optionally percent-encoded")
    ),
    responses(
        (status = 200, description = "Stored file details", body = MediaInfoResponse),
        (status = 404, description = "No stored object matches", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_media_info"))]
pub async fn get_media_info(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<MediaInfoResponse>, HttpAppError> {
    let info = state.media.info(&filename).await?;
    let api_url = format!(
        "/api/videos/{}",
        utf8_percent_encode(&info.filename, NON_ALPHANUMERIC)
    );

    Ok(Json(MediaInfoResponse {
        success: true,
        filename: info.filename,
        url: info.url,
        api_url,
        size: info.size,
        uploaded_at: info.uploaded_at,
    }))
}
