//! PipelineOptions and HardwareAccelerationMode tests.

use std::path::Path;
use std::time::Duration;

use vidnotes::configuration::{DEFAULT_FRAME_INTERVAL, DEFAULT_WORKERS};
use vidnotes::{HardwareAccelerationMode, PipelineOptions};

// ── PipelineOptions builder ──────────────────────────────────────

#[test]
fn options_defaults() {
    let options = PipelineOptions::new();
    assert_eq!(options.input_directory(), Path::new("video"));
    assert_eq!(options.output_directory(), Path::new("pdf"));
    assert_eq!(options.merged_path(), Path::new("pdf/final_merged.pdf"));
    assert_eq!(options.frame_interval(), DEFAULT_FRAME_INTERVAL);
    assert_eq!(options.workers(), DEFAULT_WORKERS);
    assert_eq!(options.workers(), 4);
    assert_eq!(options.hardware_acceleration(), HardwareAccelerationMode::Software);
    assert!((options.frames_per_second() - 0.02).abs() < 1e-12);
}

#[test]
fn options_debug_omits_callback() {
    let debug = format!("{:?}", PipelineOptions::new().with_workers(3));
    assert!(debug.contains("PipelineOptions"));
    assert!(debug.contains("workers: 3"));
    assert!(!debug.contains("progress"));
}

#[test]
fn options_with_workers_clamps_zero() {
    assert_eq!(PipelineOptions::new().with_workers(0).workers(), 1);
}

#[test]
fn options_with_frame_interval() {
    let options = PipelineOptions::new().with_frame_interval(Duration::from_secs(10));
    assert!((options.frames_per_second() - 0.1).abs() < 1e-12);

    let clamped = PipelineOptions::new().with_frame_interval(Duration::ZERO);
    assert_eq!(clamped.frame_interval(), Duration::from_millis(1));
    assert!(clamped.frames_per_second().is_finite());
}

#[test]
fn options_with_locations() {
    let options = PipelineOptions::new()
        .with_input_directory("lectures")
        .with_output_directory("notes")
        .with_merged_name("course.pdf");
    assert_eq!(options.input_directory(), Path::new("lectures"));
    assert_eq!(options.merged_path(), Path::new("notes/course.pdf"));
}

// ── HardwareAccelerationMode ─────────────────────────────────────

#[test]
fn hardware_mode_parsing() {
    assert_eq!("cuda".parse(), Ok(HardwareAccelerationMode::Cuda));
    assert_eq!("VAAPI".parse(), Ok(HardwareAccelerationMode::Vaapi));
    assert_eq!("none".parse(), Ok(HardwareAccelerationMode::Software));
    assert!("quantum".parse::<HardwareAccelerationMode>().is_err());
}

#[test]
fn hardware_mode_enabled() {
    assert!(!HardwareAccelerationMode::Software.is_enabled());
    assert!(HardwareAccelerationMode::Qsv.is_enabled());
    assert_eq!(HardwareAccelerationMode::D3d11va.to_string(), "d3d11va");
}
