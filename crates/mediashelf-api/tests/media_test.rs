//! Media API integration tests.
//!
//! Run with: `cargo test -p mediashelf-api --test media_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::{setup_test_app, VIDEO_URL};
use serde_json::{json, Value};

fn media_part(name: &str, mime: &str, data: &[u8]) -> Part {
    Part::bytes(data.to_vec()).file_name(name).mime_type(mime)
}

async fn upload_clip(app: &helpers::TestApp) -> String {
    let form = MultipartForm::new().add_part("media", media_part("Clip.mp4", "video/mp4", b"clip-bytes"));
    let response = app.client().post("/api/upload").multipart(form).await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["files"][0].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_partial_upload_reports_rejections() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part("media", media_part("Clip.mp4", "video/mp4", b"clip-bytes"))
        .add_part("media", media_part("notes.txt", "text/plain", b"hello"))
        .add_part("media", media_part("huge.mp3", "audio/mpeg", &vec![0u8; 1024 * 1024 + 1]))
        .add_text("productUrl", "https://shop.example.com/p/1");
    let response = app.client().post("/api/upload").multipart(form).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["uploaded"], 1);
    assert!(body["files"][0].as_str().unwrap().starts_with("clip_"));
    assert_eq!(
        body["errors"],
        json!([
            "notes.txt: Invalid file type. Supported: Videos (MP4, WebM, etc.) and Audio (MP3, WAV, etc.)",
            "huge.mp3: File size exceeds 1MB limit."
        ])
    );

    let registry: Value =
        serde_json::from_slice(&std::fs::read(app.registry_path()).unwrap()).unwrap();
    let stored = body["files"][0].as_str().unwrap();
    assert_eq!(registry[stored]["mediaUrl"], "https://shop.example.com/p/1");
    assert_eq!(registry[stored]["type"], "video");
}

#[tokio::test]
async fn test_upload_with_no_valid_files_is_rejected() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_part("media", media_part("notes.txt", "text/plain", b"x"));
    let response = app.client().post("/api/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NO_FILES_UPLOADED");
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    assert!(!app.registry_path().exists());
}

#[tokio::test]
async fn test_list_get_info_delete_round() {
    let app = setup_test_app().await;
    let stored = upload_clip(&app).await;

    let response = app.client().get("/api/videos").await;
    response.assert_status_ok();
    assert!(response
        .header("cache-control")
        .to_str()
        .unwrap()
        .contains("no-store"));
    let listing: Value = response.json();
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["degraded"], false);
    assert_eq!(listing["media"][0]["filename"], stored.as_str());
    assert_eq!(listing["media"][0]["title"], "clip");
    assert_eq!(listing["media"][0]["type"], "video");

    let response = app.client().get(&format!("/api/videos/{}", stored)).await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "video/mp4");
    assert_eq!(response.as_bytes().as_ref(), b"clip-bytes");

    let response = app
        .client()
        .get(&format!("/api/videos/{}/info", stored))
        .await;
    response.assert_status_ok();
    let info: Value = response.json();
    assert_eq!(info["size"], 10);
    assert_eq!(info["apiUrl"], format!("/api/videos/{}", stored.replace('_', "%5F").replace('.', "%2E")));

    let response = app
        .client()
        .delete(&format!("/api/videos/{}", stored))
        .await;
    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["storageDeleted"], true);
    assert_eq!(report["metadataCleaned"], true);
    assert_eq!(report["recordsRemoved"], 1);

    let response = app.client().get(&format!("/api/videos/{}", stored)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let listing: Value = app.client().get("/api/videos").await.json();
    assert_eq!(listing["count"], 0);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = setup_test_app().await;
    let stored = upload_clip(&app).await;
    std::fs::remove_file(app.storage_dir().join(&stored)).unwrap();

    let report: Value = app
        .client()
        .delete(&format!("/api/videos/{}", stored))
        .await
        .json();
    assert_eq!(report["storageDeleted"], false);
    assert_eq!(report["metadataCleaned"], true);

    let response = app
        .client()
        .delete(&format!("/api/videos/{}", stored))
        .await;
    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["storageDeleted"], false);
    assert_eq!(report["metadataCleaned"], false);
}

#[tokio::test]
async fn test_registry_document_is_not_served_or_deleted() {
    let app = setup_test_app().await;
    upload_clip(&app).await;

    let response = app.client().delete("/api/videos/metadata.json").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let response = app.client().get("/api/videos/metadata.json").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(app.registry_path().exists());
}

#[tokio::test]
async fn test_extract_url_registers_link() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/extract-url")
        .json(&json!({ "productUrl": VIDEO_URL }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["title"], "Never Gonna Give You Up");
    let key = body["key"].as_str().unwrap().to_string();
    assert!(key.starts_with("Never_Gonna_Give_You_Up_thumb_"));

    let listing: Value = app.client().get("/api/videos").await.json();
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["media"][0]["type"], "youtube");
    assert_eq!(listing["media"][0]["youtubeUrl"], VIDEO_URL);
    assert_eq!(listing["media"][0]["description"], "YouTube video by Rick Astley");

    let response = app.client().get(&format!("/api/videos/{}", key)).await;
    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), VIDEO_URL);

    let response = app
        .client()
        .get(&format!("/api/videos/{}", key))
        .add_query_param("thumb", "true")
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/jpeg");
}

#[tokio::test]
async fn test_extract_url_rejects_other_hosts() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/extract-url")
        .json(&json!({ "productUrl": "https://vimeo.com/76979871" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Only YouTube URLs are supported");

    let response = app
        .client()
        .post("/api/extract-url")
        .json(&json!({ "productUrl": "" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_corrupt_registry_degrades_listing_and_blocks_upload() {
    let app = setup_test_app().await;
    upload_clip(&app).await;
    std::fs::write(app.registry_path(), b"{not json").unwrap();

    let response = app.client().get("/api/videos").await;
    response.assert_status_ok();
    let listing: Value = response.json();
    assert_eq!(listing["degraded"], true);
    assert_eq!(listing["count"], 1);

    let form = MultipartForm::new().add_part("media", media_part("b.mp4", "video/mp4", b"x"));
    let response = app.client().post("/api/upload").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(std::fs::read(app.registry_path()).unwrap(), b"{not json");

    let response = app.client().get("/health/ready").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["storage"], "ok");
    assert_eq!(body["registry"], "unavailable");
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = setup_test_app().await;

    app.client().get("/health").await.assert_status_ok();

    let response = app.client().get("/health/ready").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["backend"], "local");
    assert_eq!(body["registry"], "ok");

    let spec: Value = app.client().get("/api/openapi.json").await.json();
    assert!(spec["paths"]["/api/upload"].is_object());
}
