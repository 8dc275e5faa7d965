//! Error types for the `vidnotes` crate.
//!
//! This module defines [`VidnotesError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry the paths and reasons
//! needed to diagnose a failed video without extra logging at the call site.

use std::{io::Error as IoError, path::PathBuf};

use image::ImageError;
use lopdf::Error as PdfError;
use thiserror::Error;

/// The unified error type for all `vidnotes` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VidnotesError {
    /// The external frame sampling tool is not installed or not on `PATH`.
    #[error("{tool} not installed")]
    ToolNotFound {
        /// Name or path of the tool that was looked up.
        tool: String,
    },

    /// The directory that should contain the input videos does not exist.
    #[error("input folder missing: {}", .0.display())]
    MissingInputDirectory(PathBuf),

    /// The input directory exists but holds no recognized video files.
    #[error("no video files found in {}", .0.display())]
    NoVideosFound(PathBuf),

    /// The external tool could not be spawned, or exited unsuccessfully
    /// without producing any frames.
    #[error("{tool} failed on {}: {reason}", video.display())]
    ToolFailed {
        /// Tool that was invoked.
        tool: String,
        /// Video the tool was run against.
        video: PathBuf,
        /// Exit status or spawn error.
        reason: String,
    },

    /// A frame directory holds no images, so there is nothing to assemble.
    #[error("no frames found in {}", .0.display())]
    NoFrames(PathBuf),

    /// Two inputs map to the same output identifier.
    #[error("identifier {identifier} of {} is already used by {}", path.display(), claimed_by.display())]
    IdentifierConflict {
        /// The shared identifier.
        identifier: String,
        /// The video that lost the claim.
        path: PathBuf,
        /// The video (or reserved output) that owns the identifier.
        claimed_by: PathBuf,
    },

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// A frame could not be decoded or re-encoded.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// A PDF could not be read, built, or written.
    #[error("PDF error: {0}")]
    PdfError(#[from] PdfError),
}

impl VidnotesError {
    /// Returns `true` for the startup conditions that end a run early
    /// without being treated as a failure: a missing tool, a missing input
    /// directory, or an input directory with no videos.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            VidnotesError::ToolNotFound { .. }
                | VidnotesError::MissingInputDirectory(_)
                | VidnotesError::NoVideosFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_conditions_are_informational() {
        let missing_tool = VidnotesError::ToolNotFound {
            tool: "ffmpeg".to_string(),
        };
        assert!(missing_tool.is_informational());
        assert!(VidnotesError::MissingInputDirectory(PathBuf::from("video")).is_informational());
        assert!(VidnotesError::NoVideosFound(PathBuf::from("video")).is_informational());
        assert!(!VidnotesError::NoFrames(PathBuf::from("pdf/001")).is_informational());
    }

    #[test]
    fn messages_name_the_path() {
        let error = VidnotesError::NoFrames(PathBuf::from("pdf/004"));
        assert_eq!(error.to_string(), "no frames found in pdf/004");
    }
}
