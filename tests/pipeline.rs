//! End-to-end pipeline tests with a fake sampler.

mod common;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use common::{FakeSampler, frame_width_for, page_widths, write_frames};
use vidnotes::{
    Extraction, MergeOutcome, OperationType, Pipeline, PipelineOptions, ProgressCallback,
    ProgressInfo, VidnotesError,
};

struct Workspace {
    _temp: tempfile::TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl Workspace {
    fn new(videos: &[&str]) -> Self {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("video");
        let output = temp.path().join("pdf");
        fs::create_dir_all(&input).unwrap();
        for video in videos {
            fs::write(input.join(video), b"not really a video").unwrap();
        }
        Self {
            _temp: temp,
            input,
            output,
        }
    }

    fn options(&self) -> PipelineOptions {
        PipelineOptions::new()
            .with_input_directory(&self.input)
            .with_output_directory(&self.output)
    }

    fn merged(&self) -> PathBuf {
        self.output.join("final_merged.pdf")
    }
}

fn width(video: &str) -> i64 {
    frame_width_for(Path::new(video)) as i64
}

#[derive(Default)]
struct Recording {
    events: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for Recording {
    fn on_progress(&self, info: &ProgressInfo) {
        self.events.lock().unwrap().push(info.clone());
    }
}

// ── Full runs ──────────────────────────────────────────────────────

#[test]
fn run_produces_merged_pdf_in_order() {
    let workspace = Workspace::new(&["003 c.mp4", "001 a.mp4", "002 b.mp4", "notes.txt"]);
    let pipeline = Pipeline::with_sampler(workspace.options(), FakeSampler::new(2));

    let report = pipeline.run().unwrap();
    assert_eq!(report.videos.len(), 3);
    assert_eq!(report.succeeded(), 3);
    assert!(report.is_complete());

    let names: Vec<String> = report
        .videos
        .iter()
        .map(|video| video.source.display_name())
        .collect();
    assert_eq!(names, ["001 a.mp4", "002 b.mp4", "003 c.mp4"]);

    for identifier in ["001", "002", "003"] {
        assert!(workspace.output.join(format!("{identifier}.pdf")).is_file());
        assert!(!workspace.output.join(identifier).exists());
    }

    match &report.merge {
        MergeOutcome::Written { pages, .. } => assert_eq!(*pages, 6),
        other => panic!("expected a merge, got {other:?}"),
    }
    let (a, b, c) = (width("001 a.mp4"), width("002 b.mp4"), width("003 c.mp4"));
    assert_eq!(page_widths(&workspace.merged()), [a, a, b, b, c, c]);
}

#[test]
fn rerun_reuses_every_output() {
    let workspace = Workspace::new(&["001 a.mp4", "002 b.mp4"]);
    let first = Pipeline::with_sampler(workspace.options(), FakeSampler::new(1));
    first.run().unwrap();
    assert_eq!(first.sampler().calls(), 2);

    let second = Pipeline::with_sampler(workspace.options(), FakeSampler::new(1));
    let report = second.run().unwrap();

    assert_eq!(second.sampler().calls(), 0);
    assert!(
        report
            .videos
            .iter()
            .all(|video| video.outcome.as_ref().unwrap().extraction == Extraction::NotNeeded)
    );
    assert!(matches!(report.merge, MergeOutcome::AlreadyPresent { .. }));
}

#[test]
fn leftover_frames_are_not_sampled_again() {
    let workspace = Workspace::new(&["001 a.mp4"]);
    write_frames(&workspace.output.join("001"), 3, 24, 12);

    let pipeline = Pipeline::with_sampler(workspace.options(), FakeSampler::new(1));
    let report = pipeline.run().unwrap();

    assert_eq!(pipeline.sampler().calls(), 0);
    let processed = report.videos[0].outcome.as_ref().unwrap();
    assert_eq!(processed.extraction, Extraction::AlreadyPresent { frames: 3 });
    assert_eq!(page_widths(&workspace.merged()), [24, 24, 24]);
}

// ── Failures ───────────────────────────────────────────────────────

#[test]
fn failed_video_is_missing_from_merge() {
    let workspace = Workspace::new(&["001 a.mp4", "002 broken.mp4", "003 c.mp4"]);
    let sampler = FakeSampler::new(1).failing_on("002 broken.mp4");
    let pipeline = Pipeline::with_sampler(workspace.options(), sampler);

    let report = pipeline.run().unwrap();
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.missing, ["002 broken.mp4"]);
    assert!(matches!(
        report.videos[1].outcome,
        Err(VidnotesError::ToolFailed { .. })
    ));

    assert!(!workspace.output.join("002.pdf").exists());
    assert_eq!(
        page_widths(&workspace.merged()),
        [width("001 a.mp4"), width("003 c.mp4")]
    );
}

#[test]
fn duplicate_identifier_fails_the_later_video() {
    let workspace = Workspace::new(&["1 first.mp4", "001 second.mp4"]);
    let pipeline = Pipeline::with_sampler(workspace.options(), FakeSampler::new(1));

    let report = pipeline.run().unwrap();
    assert_eq!(report.succeeded(), 1);
    assert_eq!(pipeline.sampler().sampled(), ["001 second.mp4"]);

    match &report.videos[1].outcome {
        Err(VidnotesError::IdentifierConflict { identifier, .. }) => assert_eq!(identifier, "001"),
        other => panic!("expected a conflict, got {other:?}"),
    }

    assert!(workspace.output.join("001.pdf").is_file());
    assert_eq!(report.missing, ["1 first.mp4"]);
    assert_eq!(page_widths(&workspace.merged()), [width("001 second.mp4")]);
}

#[test]
fn identifiers_differing_in_case_conflict() {
    let workspace = Workspace::new(&["Intro.mp4", "intro.mkv"]);
    let pipeline = Pipeline::with_sampler(workspace.options(), FakeSampler::new(1));

    let report = pipeline.run().unwrap();
    assert_eq!(report.succeeded(), 1);
    assert_eq!(pipeline.sampler().sampled(), ["Intro.mp4"]);
    assert!(matches!(
        report.videos[1].outcome,
        Err(VidnotesError::IdentifierConflict { .. })
    ));
    assert_eq!(report.missing, ["intro.mkv"]);
}

#[test]
fn missing_input_directory_is_informational() {
    let temp = tempfile::tempdir().unwrap();
    let options = PipelineOptions::new()
        .with_input_directory(temp.path().join("absent"))
        .with_output_directory(temp.path().join("pdf"));

    let error = Pipeline::with_sampler(options, FakeSampler::new(1))
        .run()
        .unwrap_err();
    assert!(matches!(error, VidnotesError::MissingInputDirectory(_)));
    assert!(error.is_informational());
    assert!(!temp.path().join("pdf").exists());
}

#[test]
fn no_videos_is_informational() {
    let workspace = Workspace::new(&["readme.txt", "slides.pdf"]);
    let error = Pipeline::with_sampler(workspace.options(), FakeSampler::new(1))
        .run()
        .unwrap_err();
    assert!(matches!(error, VidnotesError::NoVideosFound(_)));
    assert!(error.is_informational());
}

// ── Workers and progress ───────────────────────────────────────────

#[test]
fn single_worker_processes_everything() {
    let videos: Vec<String> = (1..=6).map(|index| format!("{index} part.mkv")).collect();
    let names: Vec<&str> = videos.iter().map(String::as_str).collect();
    let workspace = Workspace::new(&names);

    let pipeline = Pipeline::with_sampler(workspace.options().with_workers(1), FakeSampler::new(1));
    let report = pipeline.run().unwrap();

    assert_eq!(report.succeeded(), 6);
    assert_eq!(pipeline.sampler().calls(), 6);
}

#[test]
fn progress_reports_each_video_and_each_merged_pdf() {
    let workspace = Workspace::new(&["001 a.mp4", "002 b.mp4", "003 broken.mp4"]);
    let recording = Arc::new(Recording::default());
    let options = workspace.options().with_progress(recording.clone());
    let sampler = FakeSampler::new(1).failing_on("003 broken.mp4");

    Pipeline::with_sampler(options, sampler).run().unwrap();

    let events = recording.events.lock().unwrap();
    let processed: Vec<&ProgressInfo> = events
        .iter()
        .filter(|info| info.operation == OperationType::VideoProcessing && info.item.is_some())
        .collect();
    assert_eq!(processed.len(), 3);
    assert!(processed.iter().all(|info| info.total == Some(3)));
    assert_eq!(
        processed
            .iter()
            .filter(|info| info.succeeded == Some(false))
            .count(),
        1
    );

    let merged: Vec<&str> = events
        .iter()
        .filter(|info| info.operation == OperationType::Merging)
        .filter_map(|info| info.item.as_deref())
        .collect();
    assert_eq!(merged, ["001.pdf", "002.pdf"]);
}
