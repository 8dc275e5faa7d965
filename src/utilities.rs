//! Internal utility functions.
//!
//! Helpers for lossy path-to-text conversion and console-safe text that do
//! not belong in any single public module.

use std::path::Path;

/// File name of `path` as text, with invalid UTF-8 replaced.
pub fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File stem of `path` as text, with invalid UTF-8 replaced.
pub fn file_stem_lossy(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Replace every non-ASCII character with `?`.
///
/// Used as the fallback when a console cannot take UTF-8 output.
pub fn to_ascii_lossy(text: &str) -> String {
    text.chars()
        .map(|character| if character.is_ascii() { character } else { '?' })
        .collect()
}
