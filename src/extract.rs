//! Frame extraction.
//!
//! [`extract_frames`] fills a per-video frame directory with sampled frames
//! named `frame_0001.jpg`, `frame_0002.jpg`, … so that lexical order equals
//! capture order. If the directory already holds frames the sampler is not
//! invoked again.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::VidnotesError;
use crate::ffmpeg::{FFMPEG, FrameSampler, SampleRequest};
use crate::hardware_acceleration::HardwareAccelerationMode;

/// File name prefix of every sampled frame.
pub const FRAME_PREFIX: &str = "frame_";

/// Image extension of sampled frames.
pub const FRAME_EXTENSION: &str = "jpg";

/// Output pattern handed to the sampler, relative to the frame directory.
pub const FRAME_PATTERN: &str = "frame_%04d.jpg";

/// What [`extract_frames`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Frames were already present; the sampler was not run.
    AlreadyPresent {
        /// Frames found in the directory.
        frames: usize,
    },
    /// The sampler ran and left this many frames.
    Sampled {
        /// Frames found in the directory afterwards.
        frames: usize,
    },
    /// The video's PDF already exists, so sampling was not needed.
    NotNeeded,
}

impl Extraction {
    /// Returns `true` if the sampler was invoked.
    pub fn sampled(self) -> bool {
        matches!(self, Extraction::Sampled { .. })
    }
}

/// Settings for one extraction.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionSettings {
    /// Sampling rate.
    pub frames_per_second: f64,
    /// Hardware decoding mode.
    pub hardware_acceleration: HardwareAccelerationMode,
}

/// Sample frames of `video` into `frame_directory`.
///
/// Returns [`Extraction::AlreadyPresent`] without calling the sampler when
/// the directory already contains sampled frames.
///
/// A non-zero exit from the sampler is tolerated when it still produced
/// frames (ffmpeg reports trailing decode errors on truncated files). When it
/// exits non-zero and produced nothing, extraction fails immediately.
///
/// # Errors
///
/// Returns [`VidnotesError::IoError`] if the directory cannot be created or
/// read, and [`VidnotesError::ToolFailed`] as described above.
pub fn extract_frames(
    sampler: &dyn FrameSampler,
    video: &Path,
    frame_directory: &Path,
    settings: ExtractionSettings,
) -> Result<Extraction, VidnotesError> {
    let existing = count_frames(frame_directory)?;
    if existing > 0 {
        log::info!(
            "Frames already exist for {} ({} frames)",
            video.display(),
            existing
        );
        return Ok(Extraction::AlreadyPresent { frames: existing });
    }

    fs::create_dir_all(frame_directory)?;
    log::info!("Extracting frames for {}", video.display());

    let request = SampleRequest {
        video,
        frame_directory,
        output_pattern: frame_directory.join(FRAME_PATTERN),
        frames_per_second: settings.frames_per_second,
        hardware_acceleration: settings.hardware_acceleration,
    };
    let exit = sampler.sample(&request)?;
    let frames = count_frames(frame_directory)?;

    if !exit.success() {
        if frames == 0 {
            return Err(VidnotesError::ToolFailed {
                tool: FFMPEG.to_string(),
                video: video.to_path_buf(),
                reason: exit.to_string(),
            });
        }
        log::warn!(
            "{} exited with {} for {} but produced {} frames",
            FFMPEG,
            exit,
            video.display(),
            frames
        );
    }

    log::info!(
        "Frame extraction complete for {} ({} frames)",
        video.display(),
        frames
    );
    Ok(Extraction::Sampled { frames })
}

/// Sampled frame files in `frame_directory`, sorted by name.
///
/// A missing directory yields an empty list.
pub fn sampled_frames(frame_directory: &Path) -> Result<Vec<PathBuf>, VidnotesError> {
    let mut frames = images_in(frame_directory)?;
    frames.retain(|path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(FRAME_PREFIX))
    });
    Ok(frames)
}

/// Every `*.jpg` file in `directory`, sorted by name.
///
/// A missing directory yields an empty list.
pub fn images_in(directory: &Path) -> Result<Vec<PathBuf>, VidnotesError> {
    if !directory.is_dir() {
        return Ok(Vec::new());
    }

    let mut images = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        let is_image = path.is_file()
            && path
                .extension()
                .and_then(|extension| extension.to_str())
                .is_some_and(|extension| extension == FRAME_EXTENSION);
        if is_image {
            images.push(path);
        }
    }

    images.sort();
    Ok(images)
}

fn count_frames(frame_directory: &Path) -> Result<usize, VidnotesError> {
    Ok(sampled_frames(frame_directory)?.len())
}
