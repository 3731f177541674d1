// Run metrics
//
// Counters for one run of the pass processor, logged as a summary at the end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Run metrics
///
/// Atomic counters so a shared reference can be handed to the processor
/// without interior-mutability wrappers.
#[derive(Debug)]
pub struct Metrics {
    /// Enabled passes that ran to completion
    pub passes_processed: AtomicUsize,

    /// Disabled passes
    pub passes_skipped: AtomicUsize,

    /// Passes aborted by an error
    pub passes_failed: AtomicUsize,

    /// Videos submitted to PlayLater
    pub videos_queued: AtomicUsize,

    /// Videos that would have been queued outside queue mode
    pub videos_previewed: AtomicUsize,

    /// Videos skipped for any reason
    pub videos_skipped: AtomicUsize,

    /// Submissions that failed or were refused by the server
    pub queue_failures: AtomicUsize,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            passes_processed: AtomicUsize::new(0),
            passes_skipped: AtomicUsize::new(0),
            passes_failed: AtomicUsize::new(0),
            videos_queued: AtomicUsize::new(0),
            videos_previewed: AtomicUsize::new(0),
            videos_skipped: AtomicUsize::new(0),
            queue_failures: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_pass_processed(&self) {
        self.passes_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pass_skipped(&self) {
        self.passes_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pass_failed(&self) {
        self.passes_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_video_queued(&self) {
        self.videos_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_video_previewed(&self) {
        self.videos_previewed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_video_skipped(&self) {
        self.videos_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// A failed submission is also a skipped video.
    pub fn record_queue_failure(&self) {
        self.queue_failures.fetch_add(1, Ordering::Relaxed);
        self.record_video_skipped();
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Videos that reached a queue decision.
    pub fn videos_seen(&self) -> usize {
        self.videos_queued.load(Ordering::Relaxed)
            + self.videos_previewed.load(Ordering::Relaxed)
            + self.videos_skipped.load(Ordering::Relaxed)
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Run Summary ===");
        tracing::info!("Elapsed: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Passes: {} processed, {} skipped, {} failed",
            self.passes_processed.load(Ordering::Relaxed),
            self.passes_skipped.load(Ordering::Relaxed),
            self.passes_failed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Videos: {} queued, {} pending queue mode, {} skipped ({} failed submissions)",
            self.videos_queued.load(Ordering::Relaxed),
            self.videos_previewed.load(Ordering::Relaxed),
            self.videos_skipped.load(Ordering::Relaxed),
            self.queue_failures.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
