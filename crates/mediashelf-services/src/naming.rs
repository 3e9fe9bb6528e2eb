//! Storage-name generation and display-title derivation.

use std::sync::LazyLock;

use mediashelf_core::models::UNTITLED;
use regex::Regex;

const MAX_STEM_LENGTH: usize = 100;
const MAX_THUMBNAIL_TITLE_LENGTH: usize = 50;

static RANDOM_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_[a-zA-Z0-9]{16}$").expect("static pattern"));

/// Split a name into stem and extension (extension includes the dot).
///
/// A leading dot does not start an extension: `.env` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    }
}

/// Lowercase extension without the dot, if any.
pub fn extension_of(name: &str) -> Option<String> {
    let (_, ext) = split_extension(name);
    let ext = ext.trim_start_matches('.');
    (!ext.is_empty()).then(|| ext.to_lowercase())
}

/// Reduce a client-supplied filename to a safe lowercase stem and extension.
///
/// Directory components are dropped, characters outside `[A-Za-z0-9.-]`
/// become `_` and runs of `_` collapse to one.
pub fn sanitize_filename(filename: &str) -> (String, String) {
    let filename_only = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    let (stem, ext) = split_extension(filename_only);

    let mut sanitized = String::with_capacity(stem.len());
    for c in stem.chars().take(MAX_STEM_LENGTH) {
        let c = if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            c.to_ascii_lowercase()
        } else {
            '_'
        };
        let previous = sanitized.chars().last();
        if (c == '_' && previous == Some('_')) || (c == '.' && previous == Some('.')) {
            continue;
        }
        sanitized.push(c);
    }

    let sanitized = sanitized
        .trim_start_matches(['.', '_', '-'])
        .trim_end_matches('_')
        .to_string();
    let sanitized = if sanitized.is_empty() {
        "file".to_string()
    } else {
        sanitized
    };

    let ext: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect::<String>()
        .to_lowercase();

    (sanitized, ext)
}

fn random_hex(bytes: usize) -> String {
    let raw: Vec<u8> = (0..bytes).map(|_| rand::random::<u8>()).collect();
    hex::encode(raw)
}

/// `{sanitized stem}_{16 hex chars}{extension}`
pub fn generate_storage_name(original: &str) -> String {
    let (stem, ext) = sanitize_filename(original);
    format!("{}_{}{}", stem, random_hex(8), ext)
}

/// Display title for a stored file: stem without the random tail, with
/// underscores as spaces.
pub fn title_from_name(name: &str) -> String {
    let (stem, _) = split_extension(name);
    let title = RANDOM_TAIL.replace(stem, "").replace('_', " ");
    let title = title.trim();
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title.to_string()
    }
}

/// Stored name for a link thumbnail:
/// `{title, non-alphanumerics as _, at most 50 chars}_thumb_{8 hex}{ext}`.
pub fn thumbnail_name(title: &str, extension: &str) -> String {
    let safe: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(MAX_THUMBNAIL_TITLE_LENGTH)
        .collect();
    let safe = if safe.is_empty() { "video".to_string() } else { safe };
    format!("{}_thumb_{}{}", safe, random_hex(4), extension)
}

/// Registry key for a link that has no stored thumbnail.
pub fn link_key() -> String {
    format!("youtube_{}", random_hex(4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("clip.mp4"), ("clip", ".mp4"));
        assert_eq!(split_extension("a.b.MOV"), ("a.b", ".MOV"));
        assert_eq!(split_extension("noext"), ("noext", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(extension_of("Clip.MP4"), Some("mp4".to_string()));
        assert_eq!(extension_of("README"), None);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename("My Holiday  Video!!.MP4"),
            ("my_holiday_video".to_string(), ".mp4".to_string())
        );
        assert_eq!(
            sanitize_filename("../../etc/passwd.mp3"),
            ("passwd".to_string(), ".mp3".to_string())
        );
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\take..2.wav"),
            ("take.2".to_string(), ".wav".to_string())
        );
        assert_eq!(
            sanitize_filename("???.mp4"),
            ("file".to_string(), ".mp4".to_string())
        );
    }

    #[test]
    fn test_generate_storage_name_shape() {
        let name = generate_storage_name("Launch Day.mp4");
        assert!(name.starts_with("launch_day_"));
        assert!(name.ends_with(".mp4"));
        let tail = &name["launch_day_".len()..name.len() - ".mp4".len()];
        assert_eq!(tail.len(), 16);
        assert!(tail.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(name, generate_storage_name("Launch Day.mp4"));
    }

    #[test]
    fn test_title_from_name() {
        assert_eq!(title_from_name("launch_day_0123456789abcdef.mp4"), "launch day");
        assert_eq!(title_from_name("podcast.mp3"), "podcast");
        assert_eq!(title_from_name("_0123456789abcdef.mp4"), UNTITLED);
    }

    #[test]
    fn test_generated_name_yields_readable_title() {
        let name = generate_storage_name("Team Sync.webm");
        assert_eq!(title_from_name(&name), "team sync");
    }

    #[test]
    fn test_thumbnail_and_link_keys() {
        let thumb = thumbnail_name("Rust in 100 Seconds!", ".jpg");
        assert!(thumb.starts_with("Rust_in_100_Seconds__thumb_"));
        assert!(thumb.ends_with(".jpg"));

        let long = thumbnail_name(&"x".repeat(80), ".png");
        assert!(long.starts_with(&format!("{}_thumb_", "x".repeat(50))));

        let key = link_key();
        assert!(key.starts_with("youtube_"));
        assert_eq!(key.len(), "youtube_".len() + 8);
    }
}
