//! Ordering keys and identifiers derived from file names.
//!
//! Lecture videos are conventionally named with a leading sequence number
//! (`012 Lecture.mp4`). The same key orders both the input videos and the
//! per-video PDFs during the merge, so the two ends of the pipeline agree.
//!
//! # Example
//!
//! ```
//! use vidnotes::naming::{SortKey, identifier_for, leading_number, sort_key};
//!
//! assert_eq!(leading_number("012 Lecture.mp4"), Some(12));
//! assert_eq!(sort_key("Intro.mp4"), SortKey::Unordered);
//! assert!(sort_key("4000000000 Big.mp4") < sort_key("Intro.mp4"));
//! assert_eq!(identifier_for(12), "012");
//! ```

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::utilities::file_name_lossy;

/// Minimum width of a numeric identifier (`7` becomes `007`).
pub const IDENTIFIER_WIDTH: usize = 3;

/// Ordering key derived from a file name.
///
/// Every [`SortKey::Numbered`] key orders before [`SortKey::Unordered`],
/// whatever its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SortKey {
    /// The name starts with this number.
    Numbered(u64),
    /// The name has no leading number, or one too large for a `u64`.
    Unordered,
}

impl SortKey {
    /// The leading number, if there is one.
    pub fn number(self) -> Option<u64> {
        match self {
            SortKey::Numbered(number) => Some(number),
            SortKey::Unordered => None,
        }
    }
}

/// Parse the leading run of ASCII digits of `name`.
///
/// Returns `None` when the name does not start with a digit or when the
/// digit run does not fit in a `u64`.
pub fn leading_number(name: &str) -> Option<u64> {
    let end = name
        .find(|character: char| !character.is_ascii_digit())
        .unwrap_or(name.len());

    if end == 0 {
        return None;
    }

    name[..end].parse().ok()
}

/// Ordering key of `name`.
pub fn sort_key(name: &str) -> SortKey {
    leading_number(name).map_or(SortKey::Unordered, SortKey::Numbered)
}

/// Zero-padded identifier for a leading number.
pub fn identifier_for(number: u64) -> String {
    format!("{number:0width$}", width = IDENTIFIER_WIDTH)
}

/// Order two named items by [`SortKey`], breaking ties by name.
pub fn compare_names(left: &str, right: &str) -> Ordering {
    sort_key(left)
        .cmp(&sort_key(right))
        .then_with(|| left.cmp(right))
}

/// A discovered input video.
///
/// The sort key and identifier are derived once from the file name and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    path: PathBuf,
    sort_key: SortKey,
    identifier: String,
}

impl VideoSource {
    /// Derive ordering data for the video at `path`.
    ///
    /// Videos without a leading number keep their file stem as identifier so
    /// that two unnumbered lectures do not share a frame directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let key = sort_key(&file_name_lossy(&path));
        let identifier = match key {
            SortKey::Numbered(number) => identifier_for(number),
            SortKey::Unordered => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().trim().to_string())
                .filter(|stem| !stem.is_empty())
                .unwrap_or_else(|| "unnamed".to_string()),
        };

        Self {
            path,
            sort_key: key,
            identifier,
        }
    }

    /// Path of the video file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ordering key.
    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// Identifier used to name the frame directory and the per-video PDF.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// File name for display.
    pub fn display_name(&self) -> String {
        file_name_lossy(&self.path)
    }

    /// Frame directory of this video under `output_directory`.
    pub fn frame_directory(&self, output_directory: &Path) -> PathBuf {
        output_directory.join(&self.identifier)
    }

    /// Per-video PDF path under `output_directory`.
    pub fn pdf_path(&self, output_directory: &Path) -> PathBuf {
        output_directory.join(format!("{}.pdf", self.identifier))
    }
}

/// Sort videos by key, then by path so the order is deterministic.
pub fn sort_sources(sources: &mut [VideoSource]) {
    sources.sort_by(|left, right| {
        left.sort_key
            .cmp(&right.sort_key)
            .then_with(|| left.path.cmp(&right.path))
    });
}
