//! Progress-callback trait for per-job batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress`] to receive real-time
//! events as the dispatcher completes each job.
//!
//! The callback approach keeps the library ignorant of how the host
//! application communicates: the bundled CLI forwards events to an
//! indicatif progress bar, but a server could just as well forward them
//! to a channel or a database row. The trait is `Send + Sync` because
//! jobs complete concurrently.

use crate::report::{BatchStats, JobResult};
use std::sync::Arc;

/// Called by the dispatcher as the batch progresses.
///
/// All methods have default no-op implementations so callers only
/// override what they care about.
///
/// # Thread safety
///
/// `on_job_start` and `on_job_complete` may be called concurrently from
/// different tasks. Implementations must protect shared mutable state
/// with appropriate synchronisation primitives (`Mutex`, `AtomicUsize`).
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after enumeration, before any job runs.
    fn on_batch_start(&self, total_jobs: usize) {
        let _ = total_jobs;
    }

    /// Called when a job is handed to a worker.
    fn on_job_start(&self, file: &str, device: Option<u32>) {
        let _ = (file, device);
    }

    /// Called exactly once per job, in completion order (not submission
    /// order).
    fn on_job_complete(&self, result: &JobResult) {
        let _ = result;
    }

    /// Called once after every job has produced a result.
    fn on_batch_complete(&self, stats: &BatchStats) {
        let _ = stats;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
