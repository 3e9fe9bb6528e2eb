//! HTTP blob store backend.
//!
//! Wire protocol:
//! - `PUT {base}/{name}` with `authorization: Bearer <token>`, `x-content-type`
//!   and `x-add-random-suffix` headers; responds `{url, pathname}`.
//! - `GET {base}?limit=N[&prefix=P][&cursor=C]`; responds
//!   `{blobs: [{url, pathname, size, uploadedAt}], cursor, hasMore}`.
//! - `POST {base}/delete` with `{urls: [..]}`.
//!
//! Objects are publicly readable at their `url`.

use crate::keys;
use crate::traits::{BlobBackend, BlobContent, DeleteOutcome, StorageError, StorageResult};
use crate::{PhysicalObject, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Deserialize)]
struct PutBlobResponse {
    url: String,
    pathname: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListBlobResponse {
    #[serde(default)]
    blobs: Vec<ListedBlob>,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedBlob {
    url: String,
    pathname: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    uploaded_at: Option<DateTime<Utc>>,
}

impl From<ListedBlob> for PhysicalObject {
    fn from(blob: ListedBlob) -> Self {
        PhysicalObject {
            path: blob.pathname,
            locator: blob.url.clone(),
            url: blob.url,
            size: blob.size,
            modified_at: blob.uploaded_at,
        }
    }
}

/// Remote HTTP blob storage implementation
#[derive(Clone)]
pub struct RemoteBlobStorage {
    http_client: Client,
    base_url: String,
    token: String,
    page_size: usize,
}

impl std::fmt::Debug for RemoteBlobStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBlobStorage")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl RemoteBlobStorage {
    pub fn new(base_url: String, token: String, page_size: usize) -> StorageResult<Self> {
        if page_size == 0 {
            return Err(StorageError::ConfigError(
                "List page size must be positive".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                StorageError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            page_size,
        })
    }

    async fn upload(
        &self,
        name: &str,
        data: Bytes,
        content_type: &str,
        add_random_suffix: bool,
    ) -> StorageResult<PhysicalObject> {
        keys::validate_name(name)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .put(keys::join_url(&self.base_url, name))
            .bearer_auth(&self.token)
            .header("x-content-type", content_type)
            .header(
                "x-add-random-suffix",
                if add_random_suffix { "1" } else { "0" },
            )
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("{}: {}", name, e)))?;

        let response = check_status(response, name, StorageError::UploadFailed).await?;
        let stored: PutBlobResponse = response.json().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to parse upload response: {}", e))
        })?;

        tracing::info!(
            name = %name,
            stored_as = %stored.pathname,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote storage upload successful"
        );

        Ok(PhysicalObject {
            path: stored.pathname,
            locator: stored.url.clone(),
            url: stored.url,
            size,
            modified_at: Some(Utc::now()),
        })
    }

    async fn list_page(
        &self,
        prefix: Option<&str>,
        cursor: Option<&str>,
    ) -> StorageResult<ListBlobResponse> {
        let mut query: Vec<(&str, String)> = vec![("limit", self.page_size.to_string())];
        if let Some(prefix) = prefix {
            query.push(("prefix", prefix.to_string()));
        }
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let response = self
            .http_client
            .get(&self.base_url)
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(format!("List request failed: {}", e)))?;

        let response = check_status(response, "list", StorageError::BackendError).await?;
        response.json().await.map_err(|e| {
            StorageError::BackendError(format!("Failed to parse list response: {}", e))
        })
    }
}

/// Map non-success statuses to storage errors; 404 becomes `NotFound`.
async fn check_status(
    response: Response,
    subject: &str,
    other: fn(String) -> StorageError,
) -> StorageResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(StorageError::NotFound(subject.to_string()));
    }
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(other(format!("{}: {} - {}", subject, status, error_text)))
}

#[async_trait]
impl BlobBackend for RemoteBlobStorage {
    async fn put(
        &self,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<PhysicalObject> {
        self.upload(name, data, content_type, true).await
    }

    async fn put_exact(
        &self,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<PhysicalObject> {
        self.upload(name, data, content_type, false).await
    }

    async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<PhysicalObject>> {
        let mut objects = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();
        let mut pages = 0usize;

        loop {
            let page = self.list_page(prefix, cursor.as_deref()).await?;
            pages += 1;
            objects.extend(page.blobs.into_iter().map(PhysicalObject::from));

            // A cursor means another page even when `hasMore` is absent.
            if !page.has_more && page.cursor.is_none() {
                break;
            }
            match page.cursor {
                Some(next) if seen_cursors.insert(next.clone()) => cursor = Some(next),
                Some(next) => {
                    return Err(StorageError::BackendError(format!(
                        "Listing returned cursor {} twice",
                        next
                    )))
                }
                None => {
                    return Err(StorageError::BackendError(
                        "Listing reported more pages without a cursor".to_string(),
                    ))
                }
            }
        }

        tracing::debug!(
            count = objects.len(),
            pages,
            prefix = prefix.unwrap_or(""),
            "Remote storage list"
        );

        Ok(objects)
    }

    async fn get(&self, locator: &str) -> StorageResult<BlobContent> {
        Ok(BlobContent::Redirect(locator.to_string()))
    }

    async fn download(&self, locator: &str) -> StorageResult<Bytes> {
        // Cache-buster so a freshly rewritten object is never served stale.
        let response = self
            .http_client
            .get(locator)
            .query(&[("t", Utc::now().timestamp_millis().to_string())])
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("{}: {}", locator, e)))?;

        let response = check_status(response, locator, StorageError::DownloadFailed).await?;
        response
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("{}: {}", locator, e)))
    }

    async fn delete(&self, locator: &str) -> StorageResult<DeleteOutcome> {
        let response = self
            .http_client
            .post(format!("{}/delete", self.base_url))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "urls": [locator] }))
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(format!("{}: {}", locator, e)))?;

        match check_status(response, locator, StorageError::DeleteFailed).await {
            Ok(_) => {
                tracing::info!(locator = %locator, "Remote storage delete successful");
                Ok(DeleteOutcome::Deleted)
            }
            Err(StorageError::NotFound(_)) => Ok(DeleteOutcome::NotFound),
            Err(e) => Err(e),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Remote
    }
}
