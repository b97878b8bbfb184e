//! Save-path naming.
//!
//! Saved files carry a `_YYYYMMDD_HHMMSS` suffix between the stem and the
//! extension. A name that already ends in such a suffix is left alone, so
//! re-saving an earlier export never stacks timestamps.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::encode::OutputFormat;

/// `strftime` pattern of the suffix, including its leading underscore.
pub const TIMESTAMP_FORMAT: &str = "_%Y%m%d_%H%M%S";

/// Stem used when there is no original file name to derive from.
pub const FALLBACK_STEM: &str = "processed_image";

static TIMESTAMP_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_\d{8}_\d{6}$").expect("timestamp pattern is valid"));

/// Render the suffix for a point in time, e.g. `_20240101_120000`.
pub fn timestamp_suffix(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Check whether a file stem already ends in a timestamp suffix.
pub fn has_timestamp_suffix(stem: &str) -> bool {
    TIMESTAMP_SUFFIX.is_match(stem)
}

fn stem_and_extension(path: &Path) -> (Option<String>, Option<String>) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .filter(|e| !e.is_empty());
    (stem, ext)
}

/// Suggested file name for saving, derived from the loaded file's name.
///
/// `scan.jpg` becomes `scan_20240101_120000.jpg`; a name without an
/// extension gets `.png`; without an original the name is
/// `processed_image_20240101_120000.png`.
pub fn default_save_name(original: Option<&Path>, timestamp: &NaiveDateTime) -> String {
    let suffix = timestamp_suffix(timestamp);
    let (stem, ext) = original.map(stem_and_extension).unwrap_or_default();

    match stem {
        Some(stem) => {
            let ext = ext.unwrap_or_else(|| OutputFormat::default().extension().to_string());
            format!("{}{}.{}", stem, suffix, ext)
        }
        None => format!("{}{}.png", FALLBACK_STEM, suffix),
    }
}

/// Turn a user-chosen path into the final path and encoder settings.
///
/// * no extension: `.png` is added
/// * stem without a timestamp suffix: the suffix is appended
/// * unrecognized extension: replaced with `.png`
pub fn resolve_save_name(chosen: &Path, timestamp: &NaiveDateTime) -> (PathBuf, OutputFormat) {
    let (stem, ext) = stem_and_extension(chosen);
    let mut stem = stem.unwrap_or_else(|| FALLBACK_STEM.to_string());

    let (ext, format) = match ext.as_deref().and_then(OutputFormat::from_extension) {
        Some(format) => (ext.unwrap_or_default(), format),
        None => {
            let format = OutputFormat::default();
            (format.extension().to_string(), format)
        }
    };

    if !has_timestamp_suffix(&stem) {
        stem.push_str(&timestamp_suffix(timestamp));
    }

    let file_name = format!("{}.{}", stem, ext);
    let path = match chosen.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_name),
        _ => PathBuf::from(file_name),
    };
    (path, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_timestamp_suffix() {
        assert_eq!(timestamp_suffix(&noon()), "_20240101_120000");
    }

    #[test]
    fn test_suffix_detection() {
        assert!(has_timestamp_suffix("scan_20240101_120000"));
        assert!(!has_timestamp_suffix("scan_20240101_120000_copy"));
        assert!(!has_timestamp_suffix("scan_2024_1200"));
        assert!(!has_timestamp_suffix("scan"));
    }

    #[test]
    fn test_default_name_from_original() {
        let name = default_save_name(Some(Path::new("/photos/scan.jpg")), &noon());
        assert_eq!(name, "scan_20240101_120000.jpg");
    }

    #[test]
    fn test_default_name_without_extension() {
        let name = default_save_name(Some(Path::new("scan")), &noon());
        assert_eq!(name, "scan_20240101_120000.png");
    }

    #[test]
    fn test_default_name_without_original() {
        assert_eq!(
            default_save_name(None, &noon()),
            "processed_image_20240101_120000.png"
        );
    }

    #[test]
    fn test_resolve_appends_timestamp() {
        let (path, format) = resolve_save_name(Path::new("out/scan.jpg"), &noon());
        assert_eq!(path, Path::new("out/scan_20240101_120000.jpg"));
        assert_eq!(format, OutputFormat::Jpeg { quality: 95 });
    }

    #[test]
    fn test_resolve_keeps_existing_timestamp() {
        let later = noon() + chrono::Duration::hours(3);
        let (path, _) = resolve_save_name(Path::new("scan_20240101_120000.png"), &later);
        assert_eq!(path, Path::new("scan_20240101_120000.png"));
    }

    #[test]
    fn test_resolve_adds_png_when_missing() {
        let (path, format) = resolve_save_name(Path::new("result"), &noon());
        assert_eq!(path, Path::new("result_20240101_120000.png"));
        assert_eq!(format, OutputFormat::Png { compression: 3 });
    }

    #[test]
    fn test_resolve_replaces_unknown_extension() {
        let (path, format) = resolve_save_name(Path::new("dir/page.bmp"), &noon());
        assert_eq!(path, Path::new("dir/page_20240101_120000.png"));
        assert_eq!(format, OutputFormat::default());
    }

    #[test]
    fn test_resolve_keeps_extension_case() {
        let (path, format) = resolve_save_name(Path::new("IMG.JPEG"), &noon());
        assert_eq!(path, Path::new("IMG_20240101_120000.JPEG"));
        assert!(matches!(format, OutputFormat::Jpeg { .. }));
    }
}
