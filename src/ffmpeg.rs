//! The external frame sampling tool.
//!
//! Frame decoding and sampling are delegated to the `ffmpeg` command-line
//! tool. This module locates the tool, describes a sampling invocation as a
//! [`SampleRequest`], and runs it through the [`FrameSampler`] trait so the
//! rest of the pipeline does not depend on a real subprocess.
//!
//! # Example
//!
//! ```no_run
//! use vidnotes::ffmpeg::{FfmpegSampler, check_tool};
//!
//! let info = check_tool("ffmpeg");
//! if info.available {
//!     println!("ffmpeg version: {:?}", info.version);
//! }
//!
//! let sampler = FfmpegSampler::locate(None)?;
//! # Ok::<(), vidnotes::VidnotesError>(())
//! ```

use std::ffi::OsString;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::VidnotesError;
use crate::hardware_acceleration::HardwareAccelerationMode;

/// Name of the tool looked up on `PATH`.
pub const FFMPEG: &str = "ffmpeg";

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// First line of the tool's version output, if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check whether a tool answers `-version` and report its details.
pub fn check_tool(name: &str) -> ToolInfo {
    let result = Command::new(name)
        .arg("-version")
        .stdin(Stdio::null())
        .output();

    match result {
        Ok(output) if output.status.success() => ToolInfo {
            name: name.to_string(),
            available: true,
            version: String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|line| line.to_string()),
            path: which::which(name).ok(),
        },
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Resolve a tool, preferring an explicitly configured path over a `PATH`
/// lookup.
///
/// # Errors
///
/// Returns [`VidnotesError::ToolNotFound`] if neither resolves.
pub fn require_tool(name: &str, configured: Option<&Path>) -> Result<PathBuf, VidnotesError> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return which::which(path).map_err(|_| VidnotesError::ToolNotFound {
            tool: path.display().to_string(),
        });
    }

    which::which(name).map_err(|_| VidnotesError::ToolNotFound {
        tool: name.to_string(),
    })
}

/// One sampling invocation: decode `video` and write one image every
/// `1 / frames_per_second` seconds following `output_pattern`.
#[derive(Debug, Clone)]
pub struct SampleRequest<'a> {
    /// Video to decode.
    pub video: &'a Path,
    /// Directory that receives the frames.
    pub frame_directory: &'a Path,
    /// Output file pattern with a printf-style counter (`frame_%04d.jpg`).
    pub output_pattern: PathBuf,
    /// Sampling rate.
    pub frames_per_second: f64,
    /// Hardware decoding mode.
    pub hardware_acceleration: HardwareAccelerationMode,
}

impl SampleRequest<'_> {
    /// Command-line arguments for ffmpeg, in order.
    pub fn arguments(&self) -> Vec<OsString> {
        let mut arguments: Vec<OsString> = Vec::new();

        if let Some(device) = self.hardware_acceleration.ffmpeg_device() {
            arguments.push("-hwaccel".into());
            arguments.push(device.into());
        }

        arguments.push("-nostdin".into());
        arguments.push("-i".into());
        arguments.push(self.video.as_os_str().to_owned());
        arguments.push("-vf".into());
        arguments.push(format!("fps={}", self.frames_per_second).into());
        arguments.push(self.output_pattern.as_os_str().to_owned());

        arguments
    }
}

/// How the sampling tool exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolExit {
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl ToolExit {
    /// A successful exit.
    pub const SUCCESS: ToolExit = ToolExit { code: Some(0) };

    /// Returns `true` for exit code zero.
    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

impl Display for ToolExit {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("terminated by signal"),
        }
    }
}

/// Something that turns a video into sampled frame images.
///
/// Implementations must be [`Send`] and [`Sync`] because every worker of the
/// pool shares one sampler.
pub trait FrameSampler: Send + Sync {
    /// Run one sampling request to completion.
    ///
    /// An `Err` means the sampler could not run at all; a non-zero
    /// [`ToolExit`] is reported back to the caller to judge.
    fn sample(&self, request: &SampleRequest<'_>) -> Result<ToolExit, VidnotesError>;
}

/// [`FrameSampler`] backed by the ffmpeg command-line tool.
///
/// Standard output and error are discarded. The call blocks until ffmpeg
/// exits; there is no timeout.
#[derive(Debug, Clone)]
pub struct FfmpegSampler {
    program: PathBuf,
}

impl FfmpegSampler {
    /// Use the ffmpeg executable at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate ffmpeg, either at `configured` or on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`VidnotesError::ToolNotFound`] if it cannot be found.
    pub fn locate(configured: Option<&Path>) -> Result<Self, VidnotesError> {
        let program = require_tool(FFMPEG, configured)?;
        log::debug!("Using ffmpeg at {}", program.display());
        Ok(Self::new(program))
    }

    /// Path of the executable.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl FrameSampler for FfmpegSampler {
    fn sample(&self, request: &SampleRequest<'_>) -> Result<ToolExit, VidnotesError> {
        let arguments = request.arguments();
        log::debug!("Running {} {:?}", self.program.display(), arguments);

        let status = Command::new(&self.program)
            .args(&arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|error| VidnotesError::ToolFailed {
                tool: FFMPEG.to_string(),
                video: request.video.to_path_buf(),
                reason: error.to_string(),
            })?;

        Ok(ToolExit {
            code: status.code(),
        })
    }
}
