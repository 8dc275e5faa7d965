//! The per-video pipeline and the batch driver.
//!
//! [`Pipeline::process`] runs extraction, assembly and cleanup for one video
//! and turns any failure into a per-video result. [`Pipeline::run`] discovers
//! the input videos, processes them on a fixed-size worker pool, and merges
//! whatever per-video PDFs exist afterwards.
//!
//! # Example
//!
//! ```no_run
//! use vidnotes::{Pipeline, PipelineOptions};
//!
//! let pipeline = Pipeline::new(PipelineOptions::new().with_workers(4))?;
//! let report = pipeline.run()?;
//! print!("{report}");
//! # Ok::<(), vidnotes::VidnotesError>(())
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rayon::ThreadPoolBuilder;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::assemble::{Assembly, frames_to_pdf};
use crate::cleanup::{Cleanup, remove_frames};
use crate::configuration::{PipelineOptions, is_video_file};
use crate::error::VidnotesError;
use crate::extract::{Extraction, ExtractionSettings, extract_frames};
use crate::ffmpeg::{FfmpegSampler, FrameSampler};
use crate::merge::{MergeOutcome, merge_pdfs_with, per_video_pdfs};
use crate::naming::{VideoSource, sort_sources};
use crate::progress::{OperationType, ProgressTracker};
use crate::report::{RunReport, VideoReport};
use crate::utilities::file_name_lossy;

/// A video that made it through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedVideo {
    /// The per-video PDF.
    pub pdf: PathBuf,
    /// What extraction did.
    pub extraction: Extraction,
    /// What assembly did.
    pub assembly: Assembly,
    /// What cleanup did.
    pub cleanup: Cleanup,
}

/// Batch driver over a [`FrameSampler`].
pub struct Pipeline<S = FfmpegSampler> {
    options: PipelineOptions,
    sampler: S,
}

impl Pipeline<FfmpegSampler> {
    /// Create a pipeline that samples with ffmpeg found on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`VidnotesError::ToolNotFound`] if ffmpeg is not installed.
    pub fn new(options: PipelineOptions) -> Result<Self, VidnotesError> {
        Ok(Self::with_sampler(options, FfmpegSampler::locate(None)?))
    }
}

impl<S: FrameSampler> Pipeline<S> {
    /// Create a pipeline around a specific sampler.
    pub fn with_sampler(options: PipelineOptions, sampler: S) -> Self {
        Self { options, sampler }
    }

    /// The options this pipeline runs with.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// The sampler this pipeline runs with.
    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// Find the input videos, in processing order.
    ///
    /// Only files directly inside the input directory with a recognized
    /// extension are considered.
    ///
    /// # Errors
    ///
    /// Returns [`VidnotesError::MissingInputDirectory`] if the input directory
    /// does not exist.
    pub fn discover(&self) -> Result<Vec<VideoSource>, VidnotesError> {
        let input_directory = self.options.input_directory();
        if !input_directory.is_dir() {
            return Err(VidnotesError::MissingInputDirectory(
                input_directory.to_path_buf(),
            ));
        }

        let mut sources = Vec::new();
        for entry in fs::read_dir(input_directory)? {
            let path = entry?.path();
            if path.is_file() && is_video_file(&path) {
                sources.push(VideoSource::new(path));
            }
        }

        sort_sources(&mut sources);
        log::debug!(
            "Discovered {} videos in {}",
            sources.len(),
            input_directory.display()
        );
        Ok(sources)
    }

    /// Run extraction, assembly and cleanup for one video.
    ///
    /// Never fails as a whole: the returned result carries either the
    /// finished video or the reason it failed. Failures are logged at error
    /// level.
    pub fn process(&self, source: &VideoSource) -> Result<ProcessedVideo, VidnotesError> {
        log::info!("Processing {}", source.display_name());

        let result = self.process_stages(source);
        if let Err(error) = &result {
            log::error!("Error processing {}: {}", source.display_name(), error);
        }
        result
    }

    fn process_stages(&self, source: &VideoSource) -> Result<ProcessedVideo, VidnotesError> {
        let output_directory = self.options.output_directory();
        let frame_directory = source.frame_directory(output_directory);
        let pdf = source.pdf_path(output_directory);

        let extraction = if pdf.exists() {
            Extraction::NotNeeded
        } else {
            let settings = ExtractionSettings {
                frames_per_second: self.options.frames_per_second(),
                hardware_acceleration: self.options.hardware_acceleration(),
            };
            extract_frames(&self.sampler, source.path(), &frame_directory, settings)?
        };

        let assembly = match frames_to_pdf(&frame_directory, &pdf) {
            Ok(assembly) => assembly,
            Err(error @ VidnotesError::NoFrames(_)) => {
                remove_frames(&frame_directory);
                return Err(error);
            }
            Err(error) => return Err(error),
        };

        let cleanup = remove_frames(&frame_directory);

        Ok(ProcessedVideo {
            pdf,
            extraction,
            assembly,
            cleanup,
        })
    }

    /// Process every discovered video on the worker pool, then merge.
    ///
    /// # Errors
    ///
    /// Returns [`VidnotesError::MissingInputDirectory`] or
    /// [`VidnotesError::NoVideosFound`] before doing any work, and propagates
    /// errors from creating the output directory, the worker pool, or the
    /// merge. Individual video failures are reported in the [`RunReport`]
    /// instead.
    pub fn run(&self) -> Result<RunReport, VidnotesError> {
        let sources = self.discover()?;
        if sources.is_empty() {
            return Err(VidnotesError::NoVideosFound(
                self.options.input_directory().to_path_buf(),
            ));
        }

        fs::create_dir_all(self.options.output_directory())?;

        let videos = self.process_all(sources)?;
        let succeeded = videos.iter().filter(|video| video.succeeded()).count();
        log::info!("{} of {} videos processed", succeeded, videos.len());

        let merge = self.merge()?;

        let missing: Vec<String> = videos
            .iter()
            .filter(|video| {
                !video.succeeded()
                    || !video
                        .source
                        .pdf_path(self.options.output_directory())
                        .exists()
            })
            .map(|video| video.source.display_name())
            .collect();
        if !missing.is_empty() {
            log::warn!("Merged PDF is missing videos: {}", missing.join(", "));
        }

        Ok(RunReport {
            videos,
            missing,
            merge,
        })
    }

    /// Merge the per-video PDFs that exist now.
    pub fn merge(&self) -> Result<MergeOutcome, VidnotesError> {
        let output_directory = self.options.output_directory();
        let merged_path = self.options.merged_path();
        let total = per_video_pdfs(output_directory, &merged_path)?.len() as u64;

        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            OperationType::Merging,
            Some(total),
        );
        let outcome = merge_pdfs_with(output_directory, &merged_path, |input| {
            tracker.advance(&file_name_lossy(input), None);
        })?;
        tracker.finish();

        Ok(outcome)
    }

    fn process_all(&self, sources: Vec<VideoSource>) -> Result<Vec<VideoReport>, VidnotesError> {
        let conflicts = identifier_conflicts(&sources, &self.options.merged_path());

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.workers())
            .thread_name(|index| format!("vidnotes-worker-{index}"))
            .build()
            .map_err(|error| VidnotesError::WorkerPool(error.to_string()))?;

        let tracker = Mutex::new(ProgressTracker::new(
            self.options.progress.clone(),
            OperationType::VideoProcessing,
            Some(sources.len() as u64),
        ));

        let reports: Vec<VideoReport> = pool.install(|| {
            sources
                .par_iter()
                .with_max_len(1)
                .enumerate()
                .map(|(index, source)| {
                    let outcome = match conflicts.get(&index) {
                        Some(claimed_by) => {
                            let error = VidnotesError::IdentifierConflict {
                                identifier: source.identifier().to_string(),
                                path: source.path().to_path_buf(),
                                claimed_by: claimed_by.clone(),
                            };
                            log::error!("Skipping {}: {}", source.display_name(), error);
                            Err(error)
                        }
                        None => self.process(source),
                    };

                    let failure = outcome.as_ref().err().map(ToString::to_string);
                    if let Ok(mut tracker) = tracker.lock() {
                        tracker.advance(&source.display_name(), failure);
                    }

                    VideoReport {
                        source: source.clone(),
                        outcome,
                    }
                })
                .collect()
        });

        if let Ok(mut tracker) = tracker.lock() {
            tracker.finish();
        }

        Ok(reports)
    }
}

/// Indices of sources whose identifier is already taken by an earlier source
/// or by the merged output, mapped to the path that holds it.
///
/// Identifiers are compared case-insensitively, since `Intro/` and `intro/`
/// are the same directory on some filesystems.
fn identifier_conflicts(sources: &[VideoSource], merged_path: &Path) -> HashMap<usize, PathBuf> {
    let mut claimed: HashMap<String, PathBuf> = HashMap::new();
    if let Some(stem) = merged_path.file_stem() {
        claimed.insert(stem.to_string_lossy().to_lowercase(), merged_path.to_path_buf());
    }

    let mut conflicts = HashMap::new();
    for (index, source) in sources.iter().enumerate() {
        let key = source.identifier().to_lowercase();
        match claimed.get(&key) {
            Some(owner) => {
                conflicts.insert(index, owner.clone());
            }
            None => {
                claimed.insert(key, source.path().to_path_buf());
            }
        }
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_duplicates_conflict() {
        let sources = vec![
            VideoSource::new("video/001 a.mp4"),
            VideoSource::new("video/1 b.mp4"),
            VideoSource::new("video/002 c.mp4"),
            VideoSource::new("video/final_merged.mkv"),
        ];
        let conflicts = identifier_conflicts(&sources, Path::new("pdf/final_merged.pdf"));

        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[&1], PathBuf::from("video/001 a.mp4"));
        assert_eq!(conflicts[&3], PathBuf::from("pdf/final_merged.pdf"));
    }

    #[test]
    fn identifiers_differing_only_in_case_conflict() {
        let sources = vec![
            VideoSource::new("video/Intro.mp4"),
            VideoSource::new("video/intro.mkv"),
            VideoSource::new("video/Final_Merged.webm"),
        ];
        let conflicts = identifier_conflicts(&sources, Path::new("pdf/final_merged.pdf"));

        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[&1], PathBuf::from("video/Intro.mp4"));
        assert_eq!(conflicts[&2], PathBuf::from("pdf/final_merged.pdf"));
    }
}
