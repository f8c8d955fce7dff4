//! Batch outcome types: per-job results and the aggregated report.
//!
//! The dispatcher owns results exclusively — every planned job produces
//! exactly one [`JobResult`] regardless of success, skip, or failure, and
//! results are never mutated after creation.

use crate::error::PdfmillError;
use crate::job::Job;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Terminal state of one conversion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Output already existed at or above the completeness threshold;
    /// the converter was never invoked.
    Skipped,
    /// The converter ran and the output file exists.
    Succeeded,
    /// The converter failed; `message` carries the diagnostic.
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Skipped => "skipped",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of one job, created once by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// Source file name (not the full path — paths are in the log).
    pub file: String,
    /// Device the job was pinned to, if any.
    pub device: Option<u32>,
    pub status: JobStatus,
    /// Wall-clock duration of the job, including skip probes and cleanup.
    pub duration_ms: u64,
    /// Human-readable outcome line; non-empty for failures.
    pub message: String,
    /// Where the Markdown output lives (or would have lived, on failure).
    pub output: PathBuf,
}

impl JobResult {
    pub fn skipped(job: &Job, duration_ms: u64) -> Self {
        Self {
            file: job.file_name(),
            device: job.device,
            status: JobStatus::Skipped,
            duration_ms,
            message: "already converted".to_string(),
            output: job.expected_output.clone(),
        }
    }

    pub fn succeeded(job: &Job, duration_ms: u64) -> Self {
        Self {
            file: job.file_name(),
            device: job.device,
            status: JobStatus::Succeeded,
            duration_ms,
            message: "converted".to_string(),
            output: job.expected_output.clone(),
        }
    }

    pub fn failed(job: &Job, duration_ms: u64, message: impl Into<String>) -> Self {
        Self {
            file: job.file_name(),
            device: job.device,
            status: JobStatus::Failed,
            duration_ms,
            message: message.into(),
            output: job.expected_output.clone(),
        }
    }
}

/// Aggregated counters for one batch run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
}

/// Everything a batch run produced: one result per job plus counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<JobResult>,
    pub stats: BatchStats,
}

impl BatchReport {
    /// Assemble a report, computing stats from the result list.
    pub fn new(results: Vec<JobResult>, total_duration_ms: u64) -> Self {
        let stats = BatchStats {
            total: results.len(),
            succeeded: count(&results, JobStatus::Succeeded),
            skipped: count(&results, JobStatus::Skipped),
            failed: count(&results, JobStatus::Failed),
            total_duration_ms,
        };
        Self { results, stats }
    }

    pub fn has_failures(&self) -> bool {
        self.stats.failed > 0
    }

    /// Treat any job failure as an error.
    ///
    /// Returns the report unchanged when every job succeeded or was
    /// skipped; otherwise [`PdfmillError::JobsFailed`].
    pub fn into_result(self) -> Result<Self, PdfmillError> {
        if self.has_failures() {
            Err(PdfmillError::JobsFailed {
                failed: self.stats.failed,
                total: self.stats.total,
            })
        } else {
            Ok(self)
        }
    }
}

fn count(results: &[JobResult], status: JobStatus) -> usize {
    results.iter().filter(|r| r.status == status).count()
}
