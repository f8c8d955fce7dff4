//! In-process backend: text extraction via the `pdf-extract` crate.
//!
//! The cheapest of the three backends — no external tool, no credentials,
//! no network. It pulls the PDF's text layer only; scanned documents come
//! out empty (the subprocess or remote backends handle those). Extraction
//! is CPU-bound and synchronous, so it runs inside `spawn_blocking` to
//! keep the worker pool's async executor responsive.

use crate::backend::{stem, write_markdown, Converter};
use crate::error::JobError;
use crate::job::Job;
use crate::logsink::BatchLog;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Converter backed by [`pdf_extract::extract_text`].
pub struct ExtractConverter {
    output_dir: PathBuf,
}

impl ExtractConverter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl Converter for ExtractConverter {
    fn name(&self) -> &'static str {
        "extract"
    }

    fn output_path(&self, source: &Path) -> PathBuf {
        self.output_dir.join(format!("{}.md", stem(source)))
    }

    async fn convert(&self, job: &Job, log: &BatchLog) -> Result<(), JobError> {
        let source = job.source.clone();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&source))
            .await
            .map_err(|e| JobError::ExtractFailed {
                path: job.source.clone(),
                detail: format!("extraction task panicked: {e}"),
            })?
            .map_err(|e| JobError::ExtractFailed {
                path: job.source.clone(),
                detail: e.to_string(),
            })?;

        debug!("Extracted {} chars from {}", text.len(), job.source.display());
        if text.trim().is_empty() {
            log.warn(
                &job.file_name(),
                "no extractable text — scanned document? try the command or api backend",
            );
        }

        let mut markdown = text;
        if !markdown.ends_with('\n') {
            markdown.push('\n');
        }
        write_markdown(&job.expected_output, &markdown).await
    }
}
