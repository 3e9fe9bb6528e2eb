//! Upload validation and media classification.

use mediashelf_core::models::MediaKind;
use mediashelf_core::Config;

use crate::naming::extension_of;

/// Reasons a single uploaded file is rejected.
///
/// Messages are shown to clients verbatim, prefixed with the file name.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File size exceeds {max_mb}MB limit.")]
    FileTooLarge { max_mb: usize },

    #[error("Invalid file type. Supported: Videos (MP4, WebM, etc.) and Audio (MP3, WAV, etc.)")]
    InvalidFileType,

    #[error("Missing filename.")]
    MissingFilename,

    #[error("File is empty.")]
    EmptyFile,
}

/// Media file validator
///
/// Holds the upload policy: the size ceiling, accepted extensions and
/// content types, and which extensions count as audio.
#[derive(Debug, Clone)]
pub struct MediaValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
    audio_extensions: Vec<String>,
}

impl MediaValidator {
    pub fn new(
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
        audio_extensions: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            allowed_extensions,
            allowed_content_types,
            audio_extensions,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_upload_size_bytes(),
            config.media_allowed_extensions().to_vec(),
            config.media_allowed_content_types().to_vec(),
            config.audio_extensions().to_vec(),
        )
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            tracing::debug!(size, max = self.max_file_size, "Upload over size limit");
            return Err(ValidationError::FileTooLarge {
                max_mb: self.max_file_size / (1024 * 1024),
            });
        }

        Ok(())
    }

    /// Validate file extension, returning it lowercased
    pub fn validate_extension(&self, filename: &str) -> Result<String, ValidationError> {
        if filename.trim().is_empty() {
            return Err(ValidationError::MissingFilename);
        }

        match extension_of(filename) {
            Some(extension) if self.allowed_extensions.contains(&extension) => Ok(extension),
            _ => Err(ValidationError::InvalidFileType),
        }
    }

    /// Whether `content_type` is one of the configured media types.
    ///
    /// Parameters (`; codecs=...`) and case are ignored.
    pub fn is_known_content_type(&self, content_type: &str) -> bool {
        let normalized = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        self.allowed_content_types.iter().any(|ct| ct == &normalized)
    }

    /// Validate all aspects of a file
    ///
    /// The extension decides. A declared content type outside the configured
    /// list is only logged.
    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<String, ValidationError> {
        let extension = self.validate_extension(filename)?;
        if !self.is_known_content_type(content_type) {
            tracing::debug!(
                filename = %filename,
                content_type = %content_type,
                "Accepting by extension despite unlisted content type"
            );
        }
        self.validate_file_size(file_size)?;
        Ok(extension)
    }

    /// Whether a stored object name is a media file (by extension).
    pub fn is_media(&self, name: &str) -> bool {
        extension_of(name).is_some_and(|ext| self.allowed_extensions.contains(&ext))
    }

    pub fn kind_for(&self, name: &str) -> MediaKind {
        match extension_of(name) {
            Some(ext) if self.audio_extensions.contains(&ext) => MediaKind::Audio,
            _ => MediaKind::Video,
        }
    }
}

/// Content type used when serving a stored object.
pub fn content_type_for(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogg") => "video/ogg",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("flv") => "video/x-flv",
        Some("mpeg") | Some("mpg") => "video/mpeg",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}
