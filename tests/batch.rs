//! Integration tests for the batch dispatcher.
//!
//! Every test runs against temporary directories with a mock converter
//! injected through `BatchConfig::builder().converter(..)` — no network,
//! no external tools, no real PDFs. The mock records which jobs reached
//! it, which is exactly what the skip and failure-isolation properties
//! need to observe.

use async_trait::async_trait;
use pdfmill::{run_batch, BatchConfig, BatchLog, Converter, Job, JobError, JobStatus};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Converter that records invocations and writes a fixed Markdown body.
struct MockConverter {
    output_dir: PathBuf,
    calls: Mutex<Vec<String>>,
    fail_for: Option<String>,
}

impl MockConverter {
    fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            calls: Mutex::new(Vec::new()),
            fail_for: None,
        }
    }

    /// Like `new`, but `convert` fails for the named source file.
    fn failing_for(output_dir: impl Into<PathBuf>, file: &str) -> Self {
        Self {
            fail_for: Some(file.to_string()),
            ..Self::new(output_dir)
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn output_path(&self, source: &Path) -> PathBuf {
        let stem = source.file_stem().unwrap().to_string_lossy();
        self.output_dir.join(format!("{stem}.md"))
    }

    async fn convert(&self, job: &Job, _log: &BatchLog) -> Result<(), JobError> {
        self.calls.lock().unwrap().push(job.file_name());

        if self.fail_for.as_deref() == Some(job.file_name().as_str()) {
            return Err(JobError::ExtractFailed {
                path: job.source.clone(),
                detail: "synthetic failure".into(),
            });
        }

        tokio::fs::write(&job.expected_output, "# converted\n\nmock output body\n")
            .await
            .map_err(|source| JobError::OutputWrite {
                path: job.expected_output.clone(),
                source,
            })
    }
}

struct Fixture {
    _root: TempDir,
    input: PathBuf,
    output: PathBuf,
    log_dir: PathBuf,
    mock: Arc<MockConverter>,
}

impl Fixture {
    /// Create input files and a config wired to the mock converter.
    fn new(files: &[&str]) -> Self {
        let root = TempDir::new().unwrap();
        let input = root.path().join("input");
        let output = root.path().join("output");
        let log_dir = root.path().join("logs");
        std::fs::create_dir_all(&input).unwrap();
        for name in files {
            std::fs::write(input.join(name), b"%PDF-1.4 fake").unwrap();
        }
        let mock = Arc::new(MockConverter::new(&output));
        Self {
            _root: root,
            input,
            output,
            log_dir,
            mock,
        }
    }

    fn with_failing(mut self, file: &str) -> Self {
        self.mock = Arc::new(MockConverter::failing_for(&self.output, file));
        self
    }

    fn config(&self) -> BatchConfig {
        self.config_builder().build().unwrap()
    }

    fn config_builder(&self) -> pdfmill::BatchConfigBuilder {
        BatchConfig::builder()
            .input_dir(&self.input)
            .output_dir(&self.output)
            .log_dir(&self.log_dir)
            .workers(2)
            .converter(self.mock.clone() as Arc<dyn Converter>)
    }
}

// ── Idempotency (skip / reprocess) ───────────────────────────────────────────

#[tokio::test]
async fn complete_output_is_skipped() {
    let fx = Fixture::new(&["a.pdf"]);
    std::fs::create_dir_all(&fx.output).unwrap();
    std::fs::write(fx.output.join("a.md"), vec![b'x'; 2048]).unwrap();

    let report = run_batch(&fx.config()).await.unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].status, JobStatus::Skipped);
    assert_eq!(fx.mock.call_count(), 0, "converter must not run for complete output");
    assert_eq!(report.stats.skipped, 1);
}

#[tokio::test]
async fn undersized_output_is_reconverted() {
    let fx = Fixture::new(&["a.pdf"]);
    std::fs::create_dir_all(&fx.output).unwrap();
    std::fs::write(fx.output.join("a.md"), b"ten bytes!").unwrap();

    let report = run_batch(&fx.config()).await.unwrap();

    assert_eq!(report.results[0].status, JobStatus::Succeeded);
    assert_eq!(fx.mock.call_count(), 1, "undersized output must be reconverted");
    let rewritten = std::fs::read_to_string(fx.output.join("a.md")).unwrap();
    assert!(rewritten.starts_with("# converted"));
}

// ── Dispatcher invariants ────────────────────────────────────────────────────

#[tokio::test]
async fn five_jobs_two_workers_yield_exactly_five_results() {
    let files = ["a.pdf", "b.pdf", "c.pdf", "d.pdf", "e.pdf"];
    let fx = Fixture::new(&files);

    let report = run_batch(&fx.config()).await.unwrap();

    assert_eq!(report.results.len(), 5, "one result per job, no losses");
    let names: HashSet<&str> = report.results.iter().map(|r| r.file.as_str()).collect();
    assert_eq!(names.len(), 5, "no duplicate results");
    assert!(report.results.iter().all(|r| r.status == JobStatus::Succeeded));
    assert_eq!(fx.mock.call_count(), 5);
    for name in files {
        let stem = name.trim_end_matches(".pdf");
        assert!(fx.output.join(format!("{stem}.md")).is_file());
    }
}

#[tokio::test]
async fn devices_spread_round_robin() {
    let fx = Fixture::new(&["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);
    let config = fx.config_builder().device_count(2).build().unwrap();

    let report = run_batch(&config).await.unwrap();

    // Completion order is unconstrained, so assert the assignment as a
    // multiset: two jobs per device. (Exact index→device mapping is
    // covered by the planning unit tests, where order is fixed.)
    let mut devices: Vec<u32> = report.results.iter().map(|r| r.device.unwrap()).collect();
    devices.sort_unstable();
    assert_eq!(devices, vec![0, 0, 1, 1]);
}

#[tokio::test]
async fn one_failure_does_not_disturb_siblings() {
    let fx = Fixture::new(&["a.pdf", "b.pdf", "c.pdf", "d.pdf", "e.pdf"]).with_failing("c.pdf");

    let report = run_batch(&fx.config()).await.unwrap();

    assert_eq!(report.results.len(), 5);
    let failed: Vec<_> = report
        .results
        .iter()
        .filter(|r| r.status == JobStatus::Failed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].file, "c.pdf");
    assert!(!failed[0].message.is_empty(), "failure must carry a message");
    assert_eq!(report.stats.succeeded, 4);
    assert_eq!(fx.mock.call_count(), 5, "siblings still ran");

    assert!(report.has_failures());
    assert!(report.into_result().is_err());
}

#[tokio::test]
async fn empty_input_dir_is_an_empty_clean_batch() {
    let fx = Fixture::new(&[]);

    let report = run_batch(&fx.config()).await.unwrap();

    assert!(report.results.is_empty());
    assert!(!report.has_failures());
    assert!(report.into_result().is_ok());
}

#[tokio::test]
async fn missing_input_dir_is_fatal() {
    let fx = Fixture::new(&[]);
    let config = fx
        .config_builder()
        .input_dir(fx.input.join("nope"))
        .build()
        .unwrap();

    let err = run_batch(&config).await.unwrap_err();
    assert!(
        matches!(err, pdfmill::PdfmillError::InputDirNotFound { .. }),
        "got: {err}"
    );
}

// ── Logging & filters ────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_log_carries_job_tagged_lines() {
    let fx = Fixture::new(&["a.pdf"]);

    run_batch(&fx.config()).await.unwrap();

    let text = std::fs::read_to_string(fx.log_dir.join("batch.log")).unwrap();
    assert!(text.contains("[batch]"), "batch summary lines missing:\n{text}");
    assert!(text.contains("[a.pdf]"), "job-tagged lines missing:\n{text}");
    assert!(text.contains("succeeded"));
}

#[tokio::test]
async fn non_matching_files_are_ignored() {
    let fx = Fixture::new(&["a.pdf", "b.pdf"]);
    std::fs::write(fx.input.join("notes.txt"), b"not a pdf").unwrap();

    let report = run_batch(&fx.config()).await.unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(
        fx.mock.calls().iter().filter(|c| c.ends_with(".txt")).count(),
        0
    );
}

// ── Rerun behaviour ──────────────────────────────────────────────────────────

#[tokio::test]
async fn second_run_skips_everything_the_first_converted() {
    let fx = Fixture::new(&["a.pdf", "b.pdf", "c.pdf"]);
    let config = fx.config_builder().min_output_bytes(10).build().unwrap();

    let first = run_batch(&config).await.unwrap();
    assert_eq!(first.stats.succeeded, 3);

    let second = run_batch(&config).await.unwrap();
    assert_eq!(second.stats.skipped, 3);
    assert_eq!(second.stats.succeeded, 0);
    assert_eq!(fx.mock.call_count(), 3, "no reconversion on the second run");
}
