//! Idempotency check: decide whether a job's output already exists.
//!
//! A read-only filesystem probe makes repeated batch runs resumable
//! without a separate state store. The byte-size threshold guards against
//! a truncated output from a previously crashed run being mistaken for a
//! completed conversion.

use std::path::Path;

/// Completeness of a job's expected output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Output exists and meets the size threshold; skip the job.
    Complete,
    /// Output exists but is smaller than the threshold — a leftover from
    /// an interrupted run. Reconvert.
    Undersized { size: u64 },
    /// No output yet.
    Missing,
}

impl Completion {
    pub fn is_complete(self) -> bool {
        matches!(self, Completion::Complete)
    }
}

/// Probe `path` against `min_bytes`. Read-only; never creates or touches
/// the file.
pub fn completion_state(path: &Path, min_bytes: u64) -> Completion {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {
            let size = meta.len();
            if size >= min_bytes {
                Completion::Complete
            } else {
                Completion::Undersized { size }
            }
        }
        _ => Completion::Missing,
    }
}
