//! # pdfmill
//!
//! Batch-convert folders of PDF documents to Markdown by driving external
//! converters.
//!
//! ## Why this crate?
//!
//! PDF-to-Markdown conversion is a solved problem three times over — as an
//! in-process extraction library, as a GPU-hungry CLI tool, and as a
//! hosted REST API. What those converters don't solve is running one of
//! them over a folder of ten thousand documents without babysitting:
//! spreading work across a bounded pool (and a handful of GPUs), skipping
//! files a previous run already finished, sweeping up intermediate
//! artifacts, and keeping every job's diagnostics in one log. pdfmill is
//! that orchestration layer, and only that — it contains no parsing, OCR,
//! or layout logic of its own.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input dir
//!  │
//!  ├─ 1. Enumerate  list *.pdf files (directory order)
//!  ├─ 2. Plan       one Job each; device = index mod device_count
//!  ├─ 3. Dispatch   up to N jobs concurrently (buffer_unordered)
//!  │     └─ per job: clean stale artifacts → skip if output complete
//!  │                 → convert via backend → clean fresh artifacts
//!  └─ 4. Report     one JobResult per job + aggregate stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfmill::{run_batch, BackendKind, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder()
//!         .input_dir("./input")
//!         .output_dir("./output")
//!         .backend(BackendKind::Command)   // shells out to magic-pdf
//!         .workers(4)
//!         .device_count(2)                 // round-robin over 2 GPUs
//!         .build()?;
//!
//!     let report = run_batch(&config).await?;
//!     for job in &report.results {
//!         println!("{}: {} ({}ms)", job.file, job.status, job.duration_ms);
//!     }
//!     // Treat any failed job as an error (non-zero exit in the CLI):
//!     report.into_result()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Choosing a Backend
//!
//! | Backend | Wraps | Needs | Best for |
//! |---------|-------|-------|----------|
//! | `extract` | `pdf-extract` crate | nothing | digital PDFs with a text layer |
//! | `command` | `magic-pdf` CLI | tool on PATH, GPUs | scanned docs, complex layout |
//! | `api`     | hosted parse endpoint | credentials, network | no local GPU, mixed corpora |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfmill` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdfmill = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod error;
pub mod job;
pub mod logsink;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{ApiConverter, CommandConverter, Converter, ExtractConverter};
pub use config::{ApiParams, BackendKind, BatchConfig, BatchConfigBuilder};
pub use error::{JobError, PdfmillError};
pub use job::Job;
pub use logsink::BatchLog;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{BatchReport, BatchStats, JobResult, JobStatus};
pub use run::run_batch;
