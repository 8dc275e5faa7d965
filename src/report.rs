//! Run summaries.
//!
//! [`Pipeline::run`](crate::Pipeline::run) returns a [`RunReport`] listing
//! the outcome of every video, which videos the merged PDF lacks, and
//! what the merge did.
//!
//! # Example
//!
//! ```no_run
//! use vidnotes::{Pipeline, PipelineOptions};
//!
//! let report = Pipeline::new(PipelineOptions::new())?.run()?;
//! if !report.is_complete() {
//!     for video in &report.missing {
//!         println!("missing: {video}");
//!     }
//! }
//! # Ok::<(), vidnotes::VidnotesError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::VidnotesError;
use crate::merge::MergeOutcome;
use crate::naming::VideoSource;
use crate::pipeline::ProcessedVideo;

/// Outcome of one video.
#[derive(Debug)]
pub struct VideoReport {
    /// The video.
    pub source: VideoSource,
    /// The finished video, or why it failed.
    pub outcome: Result<ProcessedVideo, VidnotesError>,
}

impl VideoReport {
    /// Returns `true` if the video has a PDF.
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Summary of a whole run.
#[derive(Debug)]
pub struct RunReport {
    /// Per-video outcomes, in processing order.
    pub videos: Vec<VideoReport>,
    /// File names of discovered videos whose pages are not in the merge:
    /// failed videos and videos with no PDF at merge time.
    pub missing: Vec<String>,
    /// What the merge did.
    pub merge: MergeOutcome,
}

impl RunReport {
    /// Number of videos that have a PDF.
    pub fn succeeded(&self) -> usize {
        self.videos.iter().filter(|video| video.succeeded()).count()
    }

    /// Number of videos that failed.
    pub fn failed(&self) -> usize {
        self.videos.len() - self.succeeded()
    }

    /// Returns `true` if every discovered video is part of the merge.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for video in &self.videos {
            match &video.outcome {
                Ok(processed) => writeln!(
                    f,
                    "[OK] {} -> {}",
                    video.source.display_name(),
                    processed.pdf.display()
                )?,
                Err(error) => {
                    writeln!(f, "[FAILED] {}: {}", video.source.display_name(), error)?
                }
            }
        }

        writeln!(
            f,
            "{} of {} videos processed",
            self.succeeded(),
            self.videos.len()
        )?;

        if !self.missing.is_empty() {
            writeln!(f, "[WARN] missing from merge: {}", self.missing.join(", "))?;
        }

        match &self.merge {
            MergeOutcome::AlreadyPresent { path } => {
                writeln!(f, "Merged PDF already exists: {}", path.display())
            }
            MergeOutcome::NothingToMerge => writeln!(f, "Nothing to merge."),
            MergeOutcome::Written {
                path,
                inputs,
                pages,
            } => writeln!(
                f,
                "Merged {} PDFs ({} pages) into {}",
                inputs.len(),
                pages,
                path.display()
            ),
        }
    }
}
