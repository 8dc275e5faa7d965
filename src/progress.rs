//! Progress reporting.
//!
//! This module provides [`ProgressCallback`] for monitoring a batch run and
//! [`ProgressInfo`] for per-item progress snapshots.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vidnotes::{Pipeline, PipelineOptions, ProgressCallback, ProgressInfo, VidnotesError};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.operation);
//!         }
//!     }
//! }
//!
//! let options = PipelineOptions::new().with_progress(Arc::new(PrintProgress));
//! let report = Pipeline::new(options)?.run()?;
//! # Ok::<(), VidnotesError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The kind of operation currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Running the per-video pipeline across the worker pool.
    VideoProcessing,
    /// Appending per-video PDFs into the merged output.
    Merging,
}

/// A snapshot of run progress, delivered once per finished item.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many items have finished so far.
    pub current: u64,
    /// Total items expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Display name of the item that just finished.
    pub item: Option<String>,
    /// Whether that item succeeded. `None` on the final report.
    pub succeeded: Option<bool>,
    /// Failure reason for the item, if it failed.
    pub failure: Option<String>,
}

/// Trait for receiving progress updates during a run.
///
/// Implementations must be [`Send`] and [`Sync`] because callbacks are
/// invoked from worker threads.
pub trait ProgressCallback: Send + Sync {
    /// Called after every finished item, and once more when the operation
    /// completes.
    fn on_progress(&self, info: &ProgressInfo);
}

/// A no-op implementation that discards all progress notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Internal helper that tracks progress timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one finished item and fire the callback.
    pub(crate) fn advance(&mut self, item: &str, failure: Option<String>) {
        self.current += 1;
        let succeeded = failure.is_none();
        self.report(Some(item.to_string()), Some(succeeded), failure);
    }

    /// Unconditionally emit a final progress report.
    pub(crate) fn finish(&mut self) {
        self.report(None, None, None);
    }

    fn report(&self, item: Option<String>, succeeded: Option<bool>, failure: Option<String>) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&t| t > 0)
            .map(|t| (self.current as f32 / t as f32) * 100.0);

        let estimated_remaining = if self.current > 0 {
            self.total.map(|t| {
                let remaining = t.saturating_sub(self.current);
                let per_item = elapsed / self.current as u32;
                per_item * remaining as u32
            })
        } else {
            None
        };

        let info = ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            item,
            succeeded,
            failure,
        };

        self.callback.on_progress(&info);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recording {
        infos: Mutex<Vec<ProgressInfo>>,
    }

    impl ProgressCallback for Recording {
        fn on_progress(&self, info: &ProgressInfo) {
            self.infos.lock().unwrap().push(info.clone());
        }
    }

    #[test]
    fn tracker_reports_each_item_and_a_final_snapshot() {
        let recording = Arc::new(Recording::default());
        let mut tracker =
            ProgressTracker::new(recording.clone(), OperationType::VideoProcessing, Some(2));

        tracker.advance("001 a.mp4", None);
        tracker.advance("002 b.mp4", Some("no frames found".to_string()));
        tracker.finish();

        let infos = recording.infos.lock().unwrap();
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[0].succeeded, Some(true));
        assert_eq!(infos[0].percentage, Some(50.0));
        assert_eq!(infos[1].succeeded, Some(false));
        assert_eq!(infos[1].failure.as_deref(), Some("no frames found"));
        assert_eq!(infos[2].item, None);
        assert_eq!(infos[2].current, 2);
    }

    #[test]
    fn zero_total_has_no_percentage() {
        let recording = Arc::new(Recording::default());
        let mut tracker = ProgressTracker::new(recording.clone(), OperationType::Merging, Some(0));
        tracker.finish();

        let infos = recording.infos.lock().unwrap();
        assert_eq!(infos[0].percentage, None);
    }
}
