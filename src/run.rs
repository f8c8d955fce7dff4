//! Batch entry point and dispatcher.
//!
//! [`run_batch`] is the primary API: enumerate inputs, plan one job per
//! file, run up to `workers` jobs concurrently, and return one result per
//! job. Jobs are independent — a failure is recorded and its siblings run
//! on; nothing short of a fatal setup error (missing input directory,
//! unwritable log) aborts the batch.
//!
//! Concurrency is `futures::stream::buffer_unordered`: the job list is
//! submitted eagerly and results are collected in completion order. There
//! is no per-job timeout, no retry, and no cancellation of in-flight jobs
//! — a hung converter occupies its worker until it returns.

use crate::backend::{build_converter, Converter};
use crate::config::BatchConfig;
use crate::error::PdfmillError;
use crate::job::{plan_jobs, Job};
use crate::logsink::BatchLog;
use crate::pipeline::{cleanup, enumerate, skip};
use crate::report::{BatchReport, JobResult, JobStatus};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Convert every matching file in `config.input_dir`.
///
/// # Returns
/// `Ok(BatchReport)` whenever the batch ran, even if some (or all) jobs
/// failed — check `report.stats.failed`, or call
/// [`BatchReport::into_result`] to turn failures into an error.
///
/// # Errors
/// Returns `Err(PdfmillError)` only for fatal setup problems:
/// - Input directory missing or unlistable
/// - Output directory or log file cannot be created
/// - Backend misconfiguration (e.g. remote backend without credentials)
pub async fn run_batch(config: &BatchConfig) -> Result<BatchReport, PdfmillError> {
    let batch_start = Instant::now();
    info!(
        "Starting batch: {} → {}",
        config.input_dir.display(),
        config.output_dir.display()
    );

    if !config.input_dir.is_dir() {
        return Err(PdfmillError::InputDirNotFound {
            path: config.input_dir.clone(),
        });
    }

    // ── Resolve converter & enumerate ────────────────────────────────────
    let converter = resolve_converter(config)?;
    let files = enumerate::list_inputs(&config.input_dir, &config.suffix)?;
    info!("{} input files match '{}'", files.len(), config.suffix);

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|source| PdfmillError::OutputDirFailed {
            path: config.output_dir.clone(),
            source,
        })?;
    let log = BatchLog::open(&config.log_file())?;

    // ── Plan jobs ────────────────────────────────────────────────────────
    let jobs = plan_jobs(&files, converter.as_ref(), config.device_count);
    log.info(
        "batch",
        format!(
            "{} jobs, {} workers, backend '{}'",
            jobs.len(),
            config.workers,
            converter.name()
        ),
    );

    if let Some(ref cb) = config.progress {
        cb.on_batch_start(jobs.len());
    }

    // ── Dispatch ─────────────────────────────────────────────────────────
    let shared = Arc::new(config.clone());
    let results: Vec<JobResult> = stream::iter(jobs.into_iter().map(|job| {
        let converter = Arc::clone(&converter);
        let config = Arc::clone(&shared);
        let log = log.clone();
        async move { process_job(converter, job, config, log).await }
    }))
    .buffer_unordered(config.workers)
    .collect()
    .await;

    // ── Report ───────────────────────────────────────────────────────────
    let report = BatchReport::new(results, batch_start.elapsed().as_millis() as u64);
    log.info(
        "batch",
        format!(
            "complete: {} succeeded, {} skipped, {} failed in {}ms",
            report.stats.succeeded,
            report.stats.skipped,
            report.stats.failed,
            report.stats.total_duration_ms
        ),
    );
    info!(
        "Batch complete: {}/{} converted, {} skipped, {} failed",
        report.stats.succeeded, report.stats.total, report.stats.skipped, report.stats.failed
    );

    if let Some(ref cb) = config.progress {
        cb.on_batch_complete(&report.stats);
    }

    Ok(report)
}

/// Injected converter takes precedence; otherwise build from `config.backend`.
fn resolve_converter(config: &BatchConfig) -> Result<Arc<dyn Converter>, PdfmillError> {
    if let Some(ref converter) = config.converter {
        return Ok(Arc::clone(converter));
    }
    build_converter(config)
}

/// Run one job to completion. Infallible: every outcome, including
/// converter errors, becomes exactly one [`JobResult`].
async fn process_job(
    converter: Arc<dyn Converter>,
    job: Job,
    config: Arc<BatchConfig>,
    log: BatchLog,
) -> JobResult {
    let start = Instant::now();
    let name = job.file_name();

    if let Some(ref cb) = config.progress {
        cb.on_job_start(&name, job.device);
    }
    match job.device {
        Some(device) => log.info(&name, format!("starting on device {device}")),
        None => log.info(&name, "starting"),
    }

    let result = execute_job(converter.as_ref(), &job, &config, &log, start).await;

    let secs = result.duration_ms as f64 / 1000.0;
    match result.status {
        JobStatus::Failed => log.error(&name, format!("failed after {secs:.2}s: {}", result.message)),
        status => log.info(&name, format!("{status} in {secs:.2}s")),
    }

    if let Some(ref cb) = config.progress {
        cb.on_job_complete(&result);
    }
    result
}

/// The skip → convert → cleanup flow for one job.
async fn execute_job(
    converter: &dyn Converter,
    job: &Job,
    config: &BatchConfig,
    log: &BatchLog,
    start: Instant,
) -> JobResult {
    let name = job.file_name();

    if let Err(e) = tokio::fs::create_dir_all(job.work_dir()).await {
        return JobResult::failed(
            job,
            elapsed_ms(start),
            format!("Failed to create '{}': {e}", job.work_dir().display()),
        );
    }

    // Stale artifacts are cleared even when the job then skips.
    cleanup::clear_intermediates(job.work_dir(), converter.intermediate_files(), log, &name);

    match skip::completion_state(&job.expected_output, config.min_output_bytes) {
        skip::Completion::Complete => {
            log.info(
                &name,
                format!("skipping, output complete: {}", job.expected_output.display()),
            );
            return JobResult::skipped(job, elapsed_ms(start));
        }
        skip::Completion::Undersized { size } => {
            log.warn(
                &name,
                format!("output exists but is only {size} bytes, reprocessing"),
            );
        }
        skip::Completion::Missing => {}
    }

    match converter.convert(job, log).await {
        Ok(()) => {
            cleanup::clear_intermediates(job.work_dir(), converter.intermediate_files(), log, &name);
            JobResult::succeeded(job, elapsed_ms(start))
        }
        Err(e) => {
            warn!("Job {name} failed: {e}");
            JobResult::failed(job, elapsed_ms(start), e.to_string())
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
