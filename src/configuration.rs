//! Run configuration.
//!
//! [`PipelineOptions`] is a builder that carries the input and output
//! locations, sampling interval, hardware acceleration, worker count, and
//! progress callback through the pipeline, so no setting lives in a
//! process-wide constant.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use vidnotes::{HardwareAccelerationMode, PipelineOptions};
//!
//! let options = PipelineOptions::new()
//!     .with_input_directory("lectures")
//!     .with_output_directory("notes")
//!     .with_frame_interval(Duration::from_secs(30))
//!     .with_hardware_acceleration(HardwareAccelerationMode::Cuda)
//!     .with_workers(8);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::hardware_acceleration::HardwareAccelerationMode;
use crate::progress::{NoOpProgress, ProgressCallback};

/// Default directory scanned for input videos.
pub const DEFAULT_INPUT_DIRECTORY: &str = "video";

/// Default directory receiving frame folders and PDFs.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "pdf";

/// Default file name of the merged PDF.
pub const DEFAULT_MERGED_NAME: &str = "final_merged.pdf";

/// Default time between two sampled frames (`fps=0.02`).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_secs(50);

/// Default number of videos processed concurrently.
pub const DEFAULT_WORKERS: usize = 4;

/// Container extensions recognized as input videos (compared case-insensitively).
pub const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "webm", "mkv"];

/// Configuration for a pipeline run.
///
/// All fields have defaults matching the conventional `video/` → `pdf/`
/// layout, so a default-constructed value works from a lecture folder.
#[derive(Clone)]
pub struct PipelineOptions {
    pub(crate) input_directory: PathBuf,
    pub(crate) output_directory: PathBuf,
    pub(crate) merged_name: String,
    pub(crate) frame_interval: Duration,
    pub(crate) hardware_acceleration: HardwareAccelerationMode,
    pub(crate) workers: usize,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for PipelineOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PipelineOptions")
            .field("input_directory", &self.input_directory)
            .field("output_directory", &self.output_directory)
            .field("merged_name", &self.merged_name)
            .field("frame_interval", &self.frame_interval)
            .field("hardware_acceleration", &self.hardware_acceleration)
            .field("workers", &self.workers)
            .finish()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            input_directory: PathBuf::from(DEFAULT_INPUT_DIRECTORY),
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
            merged_name: DEFAULT_MERGED_NAME.to_string(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            hardware_acceleration: HardwareAccelerationMode::default(),
            workers: DEFAULT_WORKERS,
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Set the directory scanned for videos.
    #[must_use]
    pub fn with_input_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.input_directory = directory.into();
        self
    }

    /// Set the directory receiving frames, per-video PDFs and the merged PDF.
    #[must_use]
    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output_directory = directory.into();
        self
    }

    /// Set the file name of the merged PDF inside the output directory.
    #[must_use]
    pub fn with_merged_name(mut self, name: impl Into<String>) -> Self {
        self.merged_name = name.into();
        self
    }

    /// Set the time between two sampled frames.
    ///
    /// Clamped to a minimum of one millisecond.
    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Set the hardware decoding mode handed to ffmpeg.
    #[must_use]
    pub fn with_hardware_acceleration(mut self, mode: HardwareAccelerationMode) -> Self {
        self.hardware_acceleration = mode;
        self
    }

    /// Set how many videos are processed concurrently.
    ///
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Attach a progress callback, invoked once per finished video and once
    /// per merged PDF.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Directory scanned for videos.
    pub fn input_directory(&self) -> &Path {
        &self.input_directory
    }

    /// Directory receiving all outputs.
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Full path of the merged PDF.
    pub fn merged_path(&self) -> PathBuf {
        self.output_directory.join(&self.merged_name)
    }

    /// Time between two sampled frames.
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Sampling rate in frames per second, the reciprocal of the interval.
    pub fn frames_per_second(&self) -> f64 {
        1.0 / self.frame_interval.as_secs_f64()
    }

    /// Hardware decoding mode.
    pub fn hardware_acceleration(&self) -> HardwareAccelerationMode {
        self.hardware_acceleration
    }

    /// Number of concurrent workers.
    pub fn workers(&self) -> usize {
        self.workers
    }
}

/// Returns `true` if `path` has one of the [`VIDEO_EXTENSIONS`].
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
}
