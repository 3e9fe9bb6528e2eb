//! External video link metadata (oEmbed).

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use serde::Deserialize;

const REQUEST_TIMEOUT_SECS: u64 = 15;
const SUPPORTED_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
];

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Only YouTube URLs are supported")]
    Unsupported,

    #[error("Failed to fetch video metadata: {0}")]
    Lookup(String),

    #[error("Failed to fetch thumbnail: {0}")]
    Thumbnail(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkMetadata {
    pub title: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Bytes,
    pub content_type: String,
}

impl Thumbnail {
    /// File extension (with dot) matching the image type.
    pub fn extension(&self) -> &'static str {
        let content_type = self.content_type.to_lowercase();
        if content_type.contains("png") {
            ".png"
        } else if content_type.contains("webp") {
            ".webp"
        } else {
            ".jpg"
        }
    }
}

/// Whether `url` points at a supported video host.
pub fn is_supported_link(url: &str) -> bool {
    Url::parse(url.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .is_some_and(|host| SUPPORTED_HOSTS.contains(&host.as_str()))
}

#[async_trait]
pub trait LinkMetadataExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<LinkMetadata, LinkError>;

    async fn fetch_thumbnail(&self, url: &str) -> Result<Thumbnail, LinkError>;
}

/// Looks links up through an oEmbed endpoint.
#[derive(Clone)]
pub struct OEmbedExtractor {
    http_client: Client,
    endpoint: String,
}

impl std::fmt::Debug for OEmbedExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OEmbedExtractor")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl OEmbedExtractor {
    pub fn new(endpoint: impl Into<String>) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client for oEmbed: {}", e))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl LinkMetadataExtractor for OEmbedExtractor {
    async fn extract(&self, url: &str) -> Result<LinkMetadata, LinkError> {
        if !is_supported_link(url) {
            return Err(LinkError::Unsupported);
        }

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("url", url), ("format", "json")])
            .send()
            .await
            .map_err(|e| LinkError::Lookup(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LinkError::Lookup(format!("oEmbed returned {}", status)));
        }

        let metadata: LinkMetadata = response
            .json()
            .await
            .map_err(|e| LinkError::Lookup(format!("Malformed oEmbed response: {}", e)))?;

        tracing::debug!(url = %url, title = %metadata.title, "Link metadata fetched");
        Ok(metadata)
    }

    async fn fetch_thumbnail(&self, url: &str) -> Result<Thumbnail, LinkError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| LinkError::Thumbnail(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LinkError::Thumbnail(format!("thumbnail returned {}", status)));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let data = response
            .bytes()
            .await
            .map_err(|e| LinkError::Thumbnail(e.to_string()))?;

        Ok(Thumbnail { data, content_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_supported_links() {
        assert!(is_supported_link("https://www.youtube.com/watch?v=abc"));
        assert!(is_supported_link("https://youtu.be/abc"));
        assert!(is_supported_link("http://m.youtube.com/watch?v=abc"));
        assert!(!is_supported_link("https://vimeo.com/123"));
        assert!(!is_supported_link("https://youtube.com.evil.example/watch"));
        assert!(!is_supported_link("ftp://youtube.com/x"));
        assert!(!is_supported_link("not a url"));
    }

    #[test]
    fn test_thumbnail_extension() {
        let thumb = |ct: &str| Thumbnail {
            data: Bytes::new(),
            content_type: ct.to_string(),
        };
        assert_eq!(thumb("image/png").extension(), ".png");
        assert_eq!(thumb("image/webp").extension(), ".webp");
        assert_eq!(thumb("image/jpeg").extension(), ".jpg");
    }

    #[tokio::test]
    async fn test_extract_reads_oembed_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/oembed")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("url".into(), "https://youtu.be/abc".into()),
                Matcher::UrlEncoded("format".into(), "json".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"title":"Rust in 100 Seconds","author_name":"Fireship","thumbnail_url":"https://i.ytimg.com/vi/abc/hqdefault.jpg","type":"video"}"#,
            )
            .create_async()
            .await;

        let extractor = OEmbedExtractor::new(format!("{}/oembed", server.url())).unwrap();
        let metadata = extractor.extract("https://youtu.be/abc").await.unwrap();

        mock.assert_async().await;
        assert_eq!(metadata.title, "Rust in 100 Seconds");
        assert_eq!(metadata.author_name.as_deref(), Some("Fireship"));
        assert!(metadata.thumbnail_url.is_some());
    }

    #[tokio::test]
    async fn test_extract_rejects_unsupported_hosts_without_request() {
        let extractor = OEmbedExtractor::new("http://127.0.0.1:1/oembed").unwrap();
        assert!(matches!(
            extractor.extract("https://vimeo.com/1").await,
            Err(LinkError::Unsupported)
        ));
    }

    #[tokio::test]
    async fn test_lookup_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/oembed")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let extractor = OEmbedExtractor::new(format!("{}/oembed", server.url())).unwrap();
        assert!(matches!(
            extractor.extract("https://youtu.be/private").await,
            Err(LinkError::Lookup(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_thumbnail_keeps_content_type() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/thumb.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(b"\x89PNG")
            .create_async()
            .await;

        let extractor = OEmbedExtractor::new("http://unused").unwrap();
        let thumb = extractor
            .fetch_thumbnail(&format!("{}/thumb.png", server.url()))
            .await
            .unwrap();
        assert_eq!(thumb.extension(), ".png");
        assert_eq!(&thumb.data[..], b"\x89PNG");
    }
}
