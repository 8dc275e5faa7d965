//! Hardware-accelerated decoding for the frame sampler.
//!
//! [`HardwareAccelerationMode`] selects the `-hwaccel` device handed to
//! ffmpeg. It is threaded through
//! [`PipelineOptions`](crate::PipelineOptions) via
//! [`with_hardware_acceleration`](crate::PipelineOptions::with_hardware_acceleration).
//!
//! # Platform Support
//!
//! Availability depends on both the ffmpeg build and the host's GPU drivers.
//! An unavailable device makes ffmpeg fail for that video, which surfaces as
//! a per-video failure rather than aborting the batch.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Hardware acceleration mode for video decoding.
///
/// # Example
///
/// ```
/// use vidnotes::HardwareAccelerationMode;
///
/// let mode: HardwareAccelerationMode = "cuda".parse().unwrap();
/// assert_eq!(mode.ffmpeg_device(), Some("cuda"));
/// assert_eq!(HardwareAccelerationMode::default().ffmpeg_device(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HardwareAccelerationMode {
    /// Software decoding; no `-hwaccel` flag is passed. This is the default.
    #[default]
    Software,
    /// Let ffmpeg pick the best available hardware decoder.
    Auto,
    /// NVIDIA CUDA (Linux, Windows).
    Cuda,
    /// Video Acceleration API (Linux).
    Vaapi,
    /// Intel Quick Sync Video (cross-platform).
    Qsv,
    /// Apple VideoToolbox (macOS).
    VideoToolbox,
    /// DirectX Video Acceleration 2 (Windows).
    Dxva2,
    /// Direct3D 11 Video Acceleration (Windows).
    D3d11va,
}

impl HardwareAccelerationMode {
    /// The value passed to ffmpeg's `-hwaccel` option, or `None` for
    /// software decoding.
    pub fn ffmpeg_device(self) -> Option<&'static str> {
        match self {
            HardwareAccelerationMode::Software => None,
            HardwareAccelerationMode::Auto => Some("auto"),
            HardwareAccelerationMode::Cuda => Some("cuda"),
            HardwareAccelerationMode::Vaapi => Some("vaapi"),
            HardwareAccelerationMode::Qsv => Some("qsv"),
            HardwareAccelerationMode::VideoToolbox => Some("videotoolbox"),
            HardwareAccelerationMode::Dxva2 => Some("dxva2"),
            HardwareAccelerationMode::D3d11va => Some("d3d11va"),
        }
    }

    /// Returns `true` when a hardware device is requested.
    pub fn is_enabled(self) -> bool {
        self.ffmpeg_device().is_some()
    }
}

impl Display for HardwareAccelerationMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.ffmpeg_device().unwrap_or("software"))
    }
}

impl FromStr for HardwareAccelerationMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "software" | "sw" | "cpu" | "none" => Ok(HardwareAccelerationMode::Software),
            "auto" => Ok(HardwareAccelerationMode::Auto),
            "cuda" | "gpu" | "nvidia" => Ok(HardwareAccelerationMode::Cuda),
            "vaapi" => Ok(HardwareAccelerationMode::Vaapi),
            "qsv" => Ok(HardwareAccelerationMode::Qsv),
            "videotoolbox" => Ok(HardwareAccelerationMode::VideoToolbox),
            "dxva2" => Ok(HardwareAccelerationMode::Dxva2),
            "d3d11va" => Ok(HardwareAccelerationMode::D3d11va),
            other => Err(format!("unsupported hardware mode: {other}")),
        }
    }
}
