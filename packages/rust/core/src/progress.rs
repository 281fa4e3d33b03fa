//! Progress reporting for the long-running pipelines.

use std::time::Duration;

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each unit of work (a record, or a batch).
    fn advance(&self, current: usize, total: usize, detail: &str);
    /// Called before a deliberate pause (retry backoff, batch pacing).
    fn waiting(&self, reason: &str, delay: Duration);
    /// Called when the pipeline completes, with a one-line summary.
    fn done(&self, summary: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn advance(&self, _current: usize, _total: usize, _detail: &str) {}
    fn waiting(&self, _reason: &str, _delay: Duration) {}
    fn done(&self, _summary: &str) {}
}

/// Sleep for `delay`, telling `progress` why. Zero delays return at once.
pub(crate) async fn pause(progress: &dyn ProgressReporter, reason: &str, delay: Duration) {
    if delay.is_zero() {
        return;
    }
    progress.waiting(reason, delay);
    tokio::time::sleep(delay).await;
}
