//! Image catalog key conventions.
//!
//! Object keys look like `<owner>/<path-segments>/<YYYYMMDDHHMMSS><ext>`.
//! The capture date is recovered from the first eight characters of the
//! final path segment. Keys that do not follow the convention are still
//! listed, they just never show up under a date.

use std::collections::BTreeSet;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Extensions accepted as catalog images (case-sensitive).
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];

/// Keys starting with this prefix hold sentinel/test uploads and are hidden.
pub const DEFAULT_RESERVED_PREFIX: &str = "qu13edjkbs";

/// Compact date form embedded in keys and used for filtering.
pub const KEY_DATE_FORMAT: &str = "%Y%m%d";

// ---------------------------------------------------------------------------
// Key filtering
// ---------------------------------------------------------------------------

/// Whether `key` is a listable catalog image.
///
/// The key must end in one of [`IMAGE_EXTENSIONS`] and must not start with
/// `reserved_prefix`. An empty prefix reserves nothing.
pub fn is_catalog_image(key: &str, reserved_prefix: &str) -> bool {
    let has_image_ext = IMAGE_EXTENSIONS.iter().any(|ext| key.ends_with(ext));
    let reserved = !reserved_prefix.is_empty() && key.starts_with(reserved_prefix);
    has_image_ext && !reserved
}

/// Keep only the catalog images from a raw key listing, preserving order.
pub fn filter_image_keys<I, S>(keys: I, reserved_prefix: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keys.into_iter()
        .map(Into::into)
        .filter(|key| is_catalog_image(key, reserved_prefix))
        .collect()
}

// ---------------------------------------------------------------------------
// Date extraction
// ---------------------------------------------------------------------------

/// Parse the capture date embedded in a key.
///
/// Returns `None` when the key has no `/`, or when the first eight
/// characters of its final segment are not a valid `YYYYMMDD` date.
pub fn captured_date(key: &str) -> Option<NaiveDate> {
    let (_, file_name) = key.rsplit_once('/')?;
    let stamp = file_name.get(..8)?;
    if !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = stamp[..4].parse().ok()?;
    let month: u32 = stamp[4..6].parse().ok()?;
    let day: u32 = stamp[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Distinct capture dates across `keys`, ascending.
///
/// Malformed keys are skipped. The result does not depend on input order.
pub fn available_dates<I, S>(keys: I) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keys.into_iter()
        .filter_map(|key| captured_date(key.as_ref()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Keys containing `date` in `YYYYMMDD` form anywhere in the key.
///
/// The match runs against the whole key, not only the parsed file name, so a
/// numeric run elsewhere in the path can also match.
pub fn filter_by_date<S: AsRef<str>>(keys: &[S], date: NaiveDate) -> Vec<String> {
    let needle = date.format(KEY_DATE_FORMAT).to_string();
    keys.iter()
        .map(AsRef::as_ref)
        .filter(|key| key.contains(&needle))
        .map(str::to_string)
        .collect()
}

/// Final path segment of a key, used as the file name inside archives.
pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
