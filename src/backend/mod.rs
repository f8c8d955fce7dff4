//! Converter backends: the pluggable "convert one PDF to Markdown" seam.
//!
//! pdfmill contains no parsing, layout-analysis, or OCR logic of its own —
//! the value-bearing conversion lives in a third-party library, CLI tool,
//! or remote service. Each backend wraps exactly one of those behind the
//! [`Converter`] trait so the dispatcher in [`crate::run`] never knows
//! which one is driving.
//!
//! | Backend | Wraps | Output layout |
//! |---------|-------|---------------|
//! | [`ExtractConverter`] | in-process `pdf-extract` | `<out>/<stem>.md` |
//! | [`CommandConverter`] | external CLI tool (`magic-pdf`) | `<out>/<stem>/auto/<stem>.md` |
//! | [`ApiConverter`]     | remote REST endpoint | `<out>/<stem>.md` |

mod api;
mod command;
mod extract;

pub use api::ApiConverter;
pub use command::CommandConverter;
pub use extract::ExtractConverter;

use crate::config::{BackendKind, BatchConfig};
use crate::error::{JobError, PdfmillError};
use crate::job::Job;
use crate::logsink::BatchLog;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One PDF-to-Markdown conversion strategy.
///
/// Contract: when `convert` returns `Ok(())` the file at
/// `job.expected_output` exists. Any failure is a [`JobError`]; the
/// dispatcher converts it into a `Failed` result, so an implementation
/// never needs to worry about aborting the batch.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Short name used in log lines and `Debug` output.
    fn name(&self) -> &'static str;

    /// Where this backend leaves the Markdown for `source`. Pure — used
    /// at planning time, before anything runs.
    fn output_path(&self, source: &Path) -> PathBuf;

    /// Working files this backend is known to leave beside the output.
    /// Deleted best-effort before conversion and after a successful one.
    fn intermediate_files(&self) -> &[String] {
        &[]
    }

    /// Convert one job. Diagnostic lines go to the shared batch log.
    async fn convert(&self, job: &Job, log: &BatchLog) -> Result<(), JobError>;
}

/// Build the converter selected by `config.backend`.
///
/// An injected `config.converter` takes precedence and bypasses this
/// factory entirely (see [`crate::run::run_batch`]).
pub fn build_converter(config: &BatchConfig) -> Result<Arc<dyn Converter>, PdfmillError> {
    Ok(match config.backend {
        BackendKind::Extract => Arc::new(ExtractConverter::new(&config.output_dir)),
        BackendKind::Command => Arc::new(CommandConverter::from_config(config)),
        BackendKind::Api => Arc::new(ApiConverter::from_config(config)?),
    })
}

/// File stem of a source path, for naming its output.
pub(crate) fn stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

/// Atomic write: temp file in the target directory, then rename, so a
/// crash mid-write never leaves a partial output that a later run's
/// idempotency check could mistake for a completed conversion.
pub(crate) async fn write_markdown(path: &Path, content: &str) -> Result<(), JobError> {
    let write_err = |source| JobError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp = path.with_extension("md.tmp");
    tokio::fs::write(&tmp, content).await.map_err(write_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(write_err)
}
