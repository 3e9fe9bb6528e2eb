//! Filename resolution.
//!
//! Maps a user-facing (logical) filename to a physical object. The remote
//! backend stores `clip.mp4` as `clip-<32 alphanumerics>.mp4`, so requests
//! for the logical name must still find the suffixed object.
//!
//! Strategies run in order and the first hit wins:
//! 1. exact base-name match
//! 2. case-insensitive base-name match
//! 3. disambiguator-stripped match: the stripped stem equals, or is a prefix
//!    of / prefixed by, the requested stem (case-insensitive) and the
//!    extensions agree ignoring case.
//!
//! Within a strategy, the first object in listing order wins.

use mediashelf_core::models::PhysicalObject;

use crate::naming::split_extension;

const DISAMBIGUATOR_LENGTH: usize = 32;

/// Logical name of a disambiguated physical name, if it has a disambiguator.
///
/// `clip-AbC...(32).mp4` becomes `clip.mp4`.
pub fn strip_disambiguator(name: &str) -> Option<String> {
    let (stem, ext) = split_extension(name);
    let dash = stem.rfind('-')?;
    let tail = &stem[dash + 1..];
    if dash == 0
        || tail.len() != DISAMBIGUATOR_LENGTH
        || !tail.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(format!("{}{}", &stem[..dash], ext))
}

/// User-facing name for a physical base name.
pub fn logical_name(physical: &str) -> String {
    strip_disambiguator(physical).unwrap_or_else(|| physical.to_string())
}

/// Case-insensitive stem comparison used when correlating registry records
/// with stored objects: equal, or either contains the other. Empty stems
/// never match.
pub fn stems_related(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || a.contains(&b) || b.contains(&a)
}

/// Whether a stored object looks like the thumbnail of the link record
/// stored under `record_key`.
pub fn is_thumbnail_for(object_name: &str, record_key: &str) -> bool {
    if object_name == record_key {
        return true;
    }
    let object_base = object_name.split('.').next().unwrap_or(object_name);
    let record_base = record_key.split('.').next().unwrap_or(record_key);
    stems_related(object_base, record_base)
}

/// Find the physical object a requested logical filename refers to.
pub fn resolve<'a>(objects: &'a [PhysicalObject], requested: &str) -> Option<&'a PhysicalObject> {
    let requested = requested.trim();
    if requested.is_empty() {
        return None;
    }

    if let Some(found) = objects.iter().find(|o| o.base_name() == requested) {
        return Some(found);
    }

    let requested_lower = requested.to_lowercase();
    if let Some(found) = objects
        .iter()
        .find(|o| o.base_name().to_lowercase() == requested_lower)
    {
        return Some(found);
    }

    let (requested_stem, requested_ext) = split_extension(&requested_lower);
    if requested_stem.is_empty() {
        return None;
    }

    let stripped: Vec<(&PhysicalObject, String)> = objects
        .iter()
        .filter_map(|o| strip_disambiguator(o.base_name()).map(|l| (o, l.to_lowercase())))
        .collect();

    if let Some((found, _)) = stripped.iter().find(|(_, l)| *l == requested_lower) {
        return Some(found);
    }

    stripped
        .iter()
        .find(|(_, logical)| {
            let (stem, ext) = split_extension(logical);
            !stem.is_empty()
                && ext == requested_ext
                && (stem.starts_with(requested_stem) || requested_stem.starts_with(stem))
        })
        .map(|(found, _)| *found)
}
