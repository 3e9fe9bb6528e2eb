//! Test helpers: build the router over temp-dir storage for integration tests.
//!
//! Run from workspace root: `cargo test -p mediashelf-api`.

use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use mediashelf_api::setup::routes;
use mediashelf_api::AppState;
use mediashelf_core::{Config, MediaShelfConfig};
use mediashelf_services::{
    FileRegistryStore, LinkError, LinkMetadata, LinkMetadataExtractor, LocalBlobStorage,
    MediaRegistryService, MediaValidator, Thumbnail,
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Link extractor answering every supported URL with the same video.
pub struct FixedLinkExtractor;

#[async_trait]
impl LinkMetadataExtractor for FixedLinkExtractor {
    async fn extract(&self, _url: &str) -> Result<LinkMetadata, LinkError> {
        Ok(LinkMetadata {
            title: "Never Gonna Give You Up".to_string(),
            author_name: Some("Rick Astley".to_string()),
            thumbnail_url: Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg".to_string()),
        })
    }

    async fn fetch_thumbnail(&self, _url: &str) -> Result<Thumbnail, LinkError> {
        Ok(Thumbnail {
            data: Bytes::from_static(b"\xff\xd8\xff\xe0jpeg"),
            content_type: "image/jpeg".to_string(),
        })
    }
}

/// Test application: server plus the directory backing it.
pub struct TestApp {
    pub server: TestServer,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    pub fn registry_path(&self) -> PathBuf {
        self.temp_dir.path().join("metadata.json")
    }
}

/// Setup test app with local storage in a fresh temp dir.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = create_test_config(temp_dir.path().to_string_lossy().into_owned());

    let backend = Arc::new(
        LocalBlobStorage::new(temp_dir.path(), "/api/videos".to_string())
            .await
            .expect("Failed to create local storage"),
    );
    let registry = Arc::new(FileRegistryStore::new(temp_dir.path().join("metadata.json")));

    let media = MediaRegistryService::new(
        backend,
        registry,
        Arc::new(FixedLinkExtractor),
        MediaValidator::from_config(&config),
    );
    let state = AppState::new(config.clone(), media);

    let router = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp { server, temp_dir }
}

fn create_test_config(storage_path: String) -> Config {
    Config(Box::new(MediaShelfConfig {
        local_storage_path: Some(storage_path),
        max_upload_size_bytes: 1024 * 1024,
        ..MediaShelfConfig::default()
    }))
}
