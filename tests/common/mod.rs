//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgb, RgbImage};
use lopdf::Document;
use vidnotes::naming::leading_number;
use vidnotes::utilities::file_name_lossy;
use vidnotes::{FrameSampler, SampleRequest, ToolExit, VidnotesError};

/// Width of the frames the fake sampler writes for a video, so pages from
/// different videos can be told apart in the merged PDF.
pub fn frame_width_for(video: &Path) -> u32 {
    match leading_number(&file_name_lossy(video)) {
        Some(key) if key <= 100 => 20 + key as u32 * 4,
        _ => 16,
    }
}

/// Write `count` solid-color frames named like ffmpeg would.
pub fn write_frames(directory: &Path, count: usize, width: u32, height: u32) {
    fs::create_dir_all(directory).unwrap();
    for index in 1..=count {
        let image = RgbImage::from_pixel(width, height, Rgb([200, 40, (index * 30 % 255) as u8]));
        image
            .save(directory.join(format!("frame_{index:04}.jpg")))
            .unwrap();
    }
}

/// Page widths of a PDF, in page order.
pub fn page_widths(pdf: &Path) -> Vec<i64> {
    let document = Document::load(pdf).unwrap();
    document
        .get_pages()
        .into_values()
        .map(|page_id| {
            let page = document.get_dictionary(page_id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            media_box[2].as_i64().unwrap()
        })
        .collect()
}

/// A [`FrameSampler`] that writes small JPEGs instead of running ffmpeg.
pub struct FakeSampler {
    frames: usize,
    failing: Vec<String>,
    calls: AtomicUsize,
    sampled: Mutex<Vec<String>>,
}

impl FakeSampler {
    pub fn new(frames: usize) -> Self {
        Self {
            frames,
            failing: Vec::new(),
            calls: AtomicUsize::new(0),
            sampled: Mutex::new(Vec::new()),
        }
    }

    /// Make the sampler exit non-zero without output for this file name.
    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.failing.push(file_name.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sampled(&self) -> Vec<String> {
        self.sampled.lock().unwrap().clone()
    }
}

impl FrameSampler for FakeSampler {
    fn sample(&self, request: &SampleRequest<'_>) -> Result<ToolExit, VidnotesError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = file_name_lossy(request.video);
        self.sampled.lock().unwrap().push(name.clone());

        if self.failing.contains(&name) {
            return Ok(ToolExit { code: Some(1) });
        }

        write_frames(
            request.frame_directory,
            self.frames,
            frame_width_for(request.video),
            12,
        );
        Ok(ToolExit::SUCCESS)
    }
}
