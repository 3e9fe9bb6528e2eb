//! Configuration module
//!
//! Settings are read from the process environment (optionally seeded from a
//! `.env` file) once at startup.

use std::env;

use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 3000;
const MAX_UPLOAD_SIZE_MB: usize = 100;
const MAX_REQUEST_SIZE_MB: usize = 1024;
const REMOTE_LIST_PAGE_SIZE: usize = 1000;
const REGISTRY_DOCUMENT: &str = "metadata.json";
const LOCAL_STORAGE_PATH: &str = "./public/uploads";
const LOCAL_STORAGE_BASE_URL: &str = "/api/videos";
const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

const MEDIA_ALLOWED_EXTENSIONS: &str = "mp4,webm,ogg,mov,mkv,avi,flv,mpeg,mpg,mp3,wav,m4a,aac";
const MEDIA_ALLOWED_CONTENT_TYPES: &str = "video/mp4,video/webm,video/ogg,video/quicktime,\
video/x-matroska,video/avi,video/x-flv,video/mpeg,audio/mpeg,audio/mp3,audio/wav,\
audio/x-m4a,audio/aac,audio/ogg";
const AUDIO_EXTENSIONS: &str = "mp3,wav,m4a,aac";

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// `text` or `json`
    pub log_format: String,
    pub max_request_size_bytes: usize,
}

/// Media library configuration
#[derive(Clone, Debug)]
pub struct MediaShelfConfig {
    pub base: BaseConfig,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub remote_storage_url: Option<String>,
    pub remote_storage_token: Option<String>,
    pub remote_list_page_size: usize,
    /// Object name of the metadata registry document
    pub registry_document: String,
    // Upload policy
    pub max_upload_size_bytes: usize,
    pub media_allowed_extensions: Vec<String>,
    pub media_allowed_content_types: Vec<String>,
    pub audio_extensions: Vec<String>,
    // Link registration
    pub oembed_endpoint: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<MediaShelfConfig>);

impl Config {
    fn as_shelf(&self) -> &MediaShelfConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_shelf().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = MediaShelfConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_shelf().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_shelf().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_shelf().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_shelf().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.as_shelf().base.log_format
    }

    pub fn max_request_size_bytes(&self) -> usize {
        self.as_shelf().base.max_request_size_bytes
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_shelf().storage_backend
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_shelf().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_shelf().local_storage_base_url.as_deref()
    }

    pub fn remote_storage_url(&self) -> Option<&str> {
        self.as_shelf().remote_storage_url.as_deref()
    }

    pub fn remote_storage_token(&self) -> Option<&str> {
        self.as_shelf().remote_storage_token.as_deref()
    }

    pub fn remote_list_page_size(&self) -> usize {
        self.as_shelf().remote_list_page_size
    }

    pub fn registry_document(&self) -> &str {
        &self.as_shelf().registry_document
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_shelf().max_upload_size_bytes
    }

    pub fn media_allowed_extensions(&self) -> &[String] {
        &self.as_shelf().media_allowed_extensions
    }

    pub fn media_allowed_content_types(&self) -> &[String] {
        &self.as_shelf().media_allowed_content_types
    }

    pub fn audio_extensions(&self) -> &[String] {
        &self.as_shelf().audio_extensions
    }

    pub fn oembed_endpoint(&self) -> &str {
        &self.as_shelf().oembed_endpoint
    }
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl MediaShelfConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "text".to_string())
                .to_lowercase(),
            max_request_size_bytes: env::var("MAX_REQUEST_SIZE_MB")
                .unwrap_or_else(|_| MAX_REQUEST_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_REQUEST_SIZE_MB)
                * 1024
                * 1024,
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::Local,
        };

        let config = MediaShelfConfig {
            base,
            storage_backend,
            local_storage_path: Some(
                env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| LOCAL_STORAGE_PATH.to_string()),
            ),
            local_storage_base_url: Some(
                env::var("LOCAL_STORAGE_BASE_URL")
                    .unwrap_or_else(|_| LOCAL_STORAGE_BASE_URL.to_string()),
            ),
            remote_storage_url: env::var("REMOTE_STORAGE_URL").ok(),
            remote_storage_token: env::var("REMOTE_STORAGE_TOKEN")
                .or_else(|_| env::var("BLOB_READ_WRITE_TOKEN"))
                .ok(),
            remote_list_page_size: env::var("REMOTE_LIST_PAGE_SIZE")
                .unwrap_or_else(|_| REMOTE_LIST_PAGE_SIZE.to_string())
                .parse()
                .unwrap_or(REMOTE_LIST_PAGE_SIZE),
            registry_document: env::var("REGISTRY_DOCUMENT")
                .unwrap_or_else(|_| REGISTRY_DOCUMENT.to_string()),
            max_upload_size_bytes: env::var("MAX_UPLOAD_SIZE_MB")
                .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_UPLOAD_SIZE_MB)
                * 1024
                * 1024,
            media_allowed_extensions: split_list(
                &env::var("MEDIA_ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|_| MEDIA_ALLOWED_EXTENSIONS.to_string()),
            ),
            media_allowed_content_types: split_list(
                &env::var("MEDIA_ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|_| MEDIA_ALLOWED_CONTENT_TYPES.to_string()),
            ),
            audio_extensions: split_list(
                &env::var("AUDIO_EXTENSIONS").unwrap_or_else(|_| AUDIO_EXTENSIONS.to_string()),
            ),
            oembed_endpoint: env::var("OEMBED_ENDPOINT")
                .unwrap_or_else(|_| OEMBED_ENDPOINT.to_string()),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Remote => {
                if self.remote_storage_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "REMOTE_STORAGE_URL must be set when using remote storage backend"
                    ));
                }
                if self.remote_storage_token.is_none() {
                    return Err(anyhow::anyhow!(
                        "REMOTE_STORAGE_TOKEN (or BLOB_READ_WRITE_TOKEN) must be set when using remote storage backend"
                    ));
                }
                if self.remote_list_page_size == 0 {
                    return Err(anyhow::anyhow!("REMOTE_LIST_PAGE_SIZE must be positive"));
                }
            }
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be positive"));
        }

        if self.media_allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "MEDIA_ALLOWED_EXTENSIONS must list at least one extension"
            ));
        }

        let registry = self.registry_document.trim();
        if registry.is_empty() || registry.contains('/') || registry.contains('\\') {
            return Err(anyhow::anyhow!(
                "REGISTRY_DOCUMENT must be a plain object name"
            ));
        }

        if !matches!(self.base.log_format.as_str(), "text" | "json") {
            return Err(anyhow::anyhow!("LOG_FORMAT must be 'text' or 'json'"));
        }

        Ok(())
    }
}

impl Default for MediaShelfConfig {
    fn default() -> Self {
        MediaShelfConfig {
            base: BaseConfig {
                server_port: DEFAULT_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                log_format: "text".to_string(),
                max_request_size_bytes: MAX_REQUEST_SIZE_MB * 1024 * 1024,
            },
            storage_backend: StorageBackend::Local,
            local_storage_path: Some(LOCAL_STORAGE_PATH.to_string()),
            local_storage_base_url: Some(LOCAL_STORAGE_BASE_URL.to_string()),
            remote_storage_url: None,
            remote_storage_token: None,
            remote_list_page_size: REMOTE_LIST_PAGE_SIZE,
            registry_document: REGISTRY_DOCUMENT.to_string(),
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            media_allowed_extensions: split_list(MEDIA_ALLOWED_EXTENSIONS),
            media_allowed_content_types: split_list(MEDIA_ALLOWED_CONTENT_TYPES),
            audio_extensions: split_list(AUDIO_EXTENSIONS),
            oembed_endpoint: OEMBED_ENDPOINT.to_string(),
        }
    }
}
