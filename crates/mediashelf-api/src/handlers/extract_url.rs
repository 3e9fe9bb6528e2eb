use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, Json};
use mediashelf_core::models::LinkRegistration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ExtractUrlRequest {
    /// Video page URL (YouTube)
    #[serde(rename = "productUrl")]
    #[validate(length(min = 1, max = 2048, message = "productUrl is required"))]
    pub product_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExtractUrlResponse {
    pub success: bool,
    #[serde(flatten)]
    pub registration: LinkRegistration,
}

#[utoipa::path(
    post,
    path = "/api/extract-url",
    tag = "media",
    request_body = ExtractUrlRequest,
    responses(
        (status = 200, description = "Link registered", body = ExtractUrlResponse),
        (status = 400, description = "Unsupported URL or metadata lookup failed", body = ErrorResponse),
        (status = 503, description = "Registry unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "extract_url"))]
pub async fn extract_url(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ExtractUrlRequest>,
) -> Result<Json<ExtractUrlResponse>, HttpAppError> {
    request.validate()?;

    let registration = state.media.register_link(&request.product_url).await?;

    Ok(Json(ExtractUrlResponse {
        success: true,
        registration,
    }))
}
