//! Filename helpers for export paths.

use std::path::{Path, PathBuf};

/// Longest filename suggested to the save dialog, in characters.
const MAX_FILENAME_CHARS: usize = 200;

/// Device names Windows refuses as file stems.
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Turn a content title into a filename suggestion.
///
/// Strips characters illegal on common filesystems, trims whitespace and
/// trailing dots, and falls back to `fallback` when nothing usable remains.
#[must_use]
pub fn sanitize_filename(title: Option<&str>, fallback: &str) -> String {
    let Some(title) = title else {
        return fallback.to_string();
    };

    let cleaned: String = title
        .chars()
        .filter(|c| !c.is_control() && !is_illegal(*c))
        .take(MAX_FILENAME_CHARS)
        .collect();
    let cleaned = cleaned.trim().trim_end_matches(['.', ' ']);

    let stem = cleaned.split('.').next().unwrap_or_default();
    if cleaned.is_empty()
        || RESERVED_NAMES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(stem))
    {
        return fallback.to_string();
    }

    cleaned.to_string()
}

const fn is_illegal(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
}

/// Append `.{extension}` unless `path` already ends with it.
#[must_use]
pub fn with_package_extension(path: &Path, extension: &str) -> PathBuf {
    let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == extension);
    if matches {
        return path.to_path_buf();
    }

    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
