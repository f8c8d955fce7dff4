//! Error types for the pdfmill library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PdfmillError`] — **Fatal**: the batch cannot run at all (missing
//!   input directory, invalid configuration, unwritable log file).
//!   Returned as `Err(PdfmillError)` from [`crate::run::run_batch`].
//!
//! * [`JobError`] — **Non-fatal**: a single conversion job failed (tool
//!   exited non-zero, API rejected the upload, output could not be
//!   written) but every other job is unaffected. Converted into a
//!   `Failed` [`crate::report::JobResult`] at the job boundary so the
//!   batch always completes and reports per-job outcomes.
//!
//! The separation lets callers decide their own tolerance: inspect the
//! report and carry on, or call [`crate::report::BatchReport::into_result`]
//! to treat any job failure as an error.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfmill library.
///
/// Job-level failures use [`JobError`] and are recorded in
/// [`crate::report::JobResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PdfmillError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input directory was not found at the given path.
    #[error("Input directory not found: '{path}'\nCheck the path exists and is readable.")]
    InputDirNotFound { path: PathBuf },

    /// The input directory exists but could not be listed.
    #[error("Failed to list input directory '{path}': {source}")]
    InputDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or open the batch log file.
    #[error("Failed to open log file '{path}': {source}")]
    LogOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create the output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Aggregate outcome ─────────────────────────────────────────────────
    /// At least one job failed.
    ///
    /// Returned by [`crate::report::BatchReport::into_result`] when the
    /// caller wants to treat any job failure as an error (the CLI uses
    /// this to exit non-zero).
    #[error("{failed}/{total} jobs failed during batch conversion")]
    JobsFailed { failed: usize, total: usize },
}

/// A non-fatal error for a single conversion job.
///
/// Whatever the backend, a `JobError` is caught by the dispatcher and
/// turned into a `Failed` result with this error's message. It never
/// aborts sibling jobs or the batch.
#[derive(Debug, Error)]
pub enum JobError {
    /// Could not read the source PDF.
    #[error("Failed to read input '{path}': {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external tool binary could not be started at all.
    #[error("Failed to spawn '{tool}': {source}\nCheck the tool is installed and on PATH.")]
    SpawnFailed {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool ran but exited non-zero. Diagnostics are in the
    /// batch log, where the tool's stdout/stderr were redirected.
    #[error("'{tool}' exited with {}", .code.map_or_else(|| "signal".to_string(), |c| format!("status {c}")))]
    ToolFailed { tool: String, code: Option<i32> },

    /// HTTP transport failure talking to the remote API.
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote API answered with a non-200 status.
    #[error("API returned HTTP {status}: {body}")]
    ApiStatus { status: u16, body: String },

    /// HTTP 200 but the decoded body carried no `result.markdown` key.
    #[error("API response missing 'result.markdown': {body}")]
    ApiShape { body: String },

    /// In-process text extraction failed.
    #[error("Text extraction failed for '{path}': {detail}")]
    ExtractFailed { path: PathBuf, detail: String },

    /// Could not create or write the output Markdown file.
    #[error("Failed to write output '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not duplicate the log handle for subprocess redirection.
    #[error("Failed to attach batch log to subprocess: {source}")]
    LogRedirect {
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobs_failed_display() {
        let e = PdfmillError::JobsFailed {
            failed: 2,
            total: 7,
        };
        let msg = e.to_string();
        assert!(msg.contains("2/7"), "got: {msg}");
    }

    #[test]
    fn input_dir_not_found_display() {
        let e = PdfmillError::InputDirNotFound {
            path: PathBuf::from("/no/such/dir"),
        };
        assert!(e.to_string().contains("/no/such/dir"));
    }

    #[test]
    fn tool_failed_display_with_code() {
        let e = JobError::ToolFailed {
            tool: "magic-pdf".into(),
            code: Some(2),
        };
        let msg = e.to_string();
        assert!(msg.contains("magic-pdf"));
        assert!(msg.contains("status 2"));
    }

    #[test]
    fn tool_failed_display_signal() {
        let e = JobError::ToolFailed {
            tool: "magic-pdf".into(),
            code: None,
        };
        assert!(e.to_string().contains("signal"));
    }

    #[test]
    fn api_status_display() {
        let e = JobError::ApiStatus {
            status: 403,
            body: "invalid credentials".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("invalid credentials"));
    }

    #[test]
    fn api_shape_display() {
        let e = JobError::ApiShape {
            body: "{\"code\":40101}".into(),
        };
        assert!(e.to_string().contains("result.markdown"));
    }
}
