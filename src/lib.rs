//! # vidnotes
//!
//! Turn a folder of lecture videos into one PDF of sampled slide frames.
//!
//! `vidnotes` samples one frame every few tens of seconds from each video
//! with the [`ffmpeg`](https://ffmpeg.org) command-line tool, lays the frames
//! out as the pages of a per-video PDF, deletes the frames again, and finally
//! concatenates every per-video PDF in lecture order.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vidnotes::{Pipeline, PipelineOptions};
//!
//! // Reads `video/`, writes `pdf/001.pdf`, `pdf/002.pdf`, … and
//! // `pdf/final_merged.pdf`.
//! let report = Pipeline::new(PipelineOptions::new())?.run()?;
//! println!("{} of {} videos processed", report.succeeded(), report.videos.len());
//! # Ok::<(), vidnotes::VidnotesError>(())
//! ```
//!
//! ## Ordering
//!
//! Videos are ordered by the number their file name starts with
//! (`2 Intro.mp4` comes before `10 Recap.mp4`); names without a leading number
//! go last. The same rule orders the per-video PDFs during the merge. See
//! [`naming`].
//!
//! ## Re-running
//!
//! Every stage checks for its own output first: existing frames are not
//! sampled again, existing per-video PDFs are not rebuilt, and an existing
//! merged PDF is not rewritten. Delete an output to have it regenerated.
//!
//! ## Failures
//!
//! A video that cannot be processed is logged and reported in the
//! [`RunReport`]; the other videos and the merge go ahead without it.
//!
//! ## Requirements
//!
//! `ffmpeg` must be installed and on `PATH` (or passed explicitly to
//! [`FfmpegSampler::locate`]).

pub mod assemble;
pub mod cleanup;
pub mod configuration;
pub mod error;
pub mod extract;
pub mod ffmpeg;
pub mod hardware_acceleration;
pub mod merge;
pub mod naming;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod utilities;

pub use assemble::{Assembly, frames_to_pdf};
pub use cleanup::{Cleanup, remove_frames};
pub use configuration::PipelineOptions;
pub use error::VidnotesError;
pub use extract::{Extraction, ExtractionSettings, extract_frames};
pub use ffmpeg::{FfmpegSampler, FrameSampler, SampleRequest, ToolExit};
pub use hardware_acceleration::HardwareAccelerationMode;
pub use merge::{MergeOutcome, merge_pdfs};
pub use naming::VideoSource;
pub use pipeline::{Pipeline, ProcessedVideo};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use report::{RunReport, VideoReport};
