//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use mediashelf_core::models;

pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mediashelf API",
        version = "0.1.0",
        description = "Media library over local or remote blob storage: upload video and audio files, register external video links, list, serve and delete them."
    ),
    paths(
        handlers::upload::upload_media,
        handlers::media_list::list_media,
        handlers::media_get::get_media,
        handlers::media_get::get_media_info,
        handlers::media_delete::delete_media,
        handlers::extract_url::extract_url,
    ),
    components(
        schemas(
            error::ErrorResponse,
            handlers::upload::UploadResponse,
            handlers::media_list::ListResponse,
            handlers::media_get::MediaInfoResponse,
            handlers::media_delete::DeleteResponse,
            handlers::extract_url::ExtractUrlRequest,
            handlers::extract_url::ExtractUrlResponse,
            models::MediaEntry,
            models::MediaKind,
            models::MediaListing,
            models::UploadReport,
            models::DeleteReport,
            models::LinkRegistration,
        )
    ),
    tags(
        (name = "media", description = "Media library operations")
    )
)]
pub struct ApiDoc;
