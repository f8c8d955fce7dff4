//! CLI binary for pdfmill.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `BatchConfig` and prints per-job results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfmill::{
    run_batch, ApiParams, BackendKind, BatchConfig, BatchProgressCallback, BatchStats, JobResult,
    JobStatus, ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-job log
/// lines using [indicatif]. Jobs complete out-of-order, so each completion
/// stamps the bar with the current wall-clock time rather than assuming
/// any sequence.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically by
    /// `on_batch_start` (called after enumeration).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Listing input files…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_jobs: usize) {
        self.activate_bar(total_jobs);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_jobs} files…"))
        ));
    }

    fn on_job_start(&self, file: &str, device: Option<u32>) {
        match device {
            Some(d) => self.bar.println(format!(
                "  {} {}  {}",
                dim("▸"),
                file,
                dim(&format!("device {d}"))
            )),
            None => self.bar.println(format!("  {} {}", dim("▸"), file)),
        }
    }

    fn on_job_complete(&self, result: &JobResult) {
        let secs = result.duration_ms as f64 / 1000.0;
        let line = match result.status {
            JobStatus::Succeeded => format!(
                "  {} {:<40} {}",
                green("✓"),
                result.file,
                dim(&format!("{secs:.1}s"))
            ),
            JobStatus::Skipped => format!(
                "  {} {:<40} {}",
                cyan("↷"),
                result.file,
                dim("already converted")
            ),
            JobStatus::Failed => {
                // Truncate very long error messages to keep output tidy.
                let msg = if result.message.len() > 80 {
                    let cut: String = result.message.chars().take(79).collect();
                    format!("{cut}\u{2026}")
                } else {
                    result.message.clone()
                };
                format!(
                    "  {} {:<40} {}  {}",
                    red("✗"),
                    result.file,
                    red(&msg),
                    dim(&format!("{secs:.1}s"))
                )
            }
        };
        self.bar.println(line);
        self.bar
            .set_message(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, stats: &BatchStats) {
        self.bar.finish_and_clear();

        if stats.failed == 0 {
            eprintln!(
                "{} {} files done ({} converted, {} skipped)",
                green("✔"),
                bold(&stats.total.to_string()),
                stats.succeeded,
                stats.skipped,
            );
        } else {
            eprintln!(
                "{} {}/{} files done  ({} failed)",
                if stats.failed == stats.total {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&(stats.succeeded + stats.skipped).to_string()),
                stats.total,
                red(&stats.failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract text layers from every PDF in ./input (no external tool needed)
  pdfmill ./input -o ./output

  # Drive magic-pdf across 2 GPUs with 4 workers
  pdfmill ./input -o ./output --backend command --workers 4 --devices 2

  # Remote parse API, OCR forced, tables as Markdown
  export PDFMILL_APP_ID=... PDFMILL_SECRET_CODE=...
  pdfmill ./input -o ./output --backend api --parse-mode scan --table-flavor md

  # Rerun a crashed batch — completed files are skipped
  pdfmill ./input -o ./output --backend command

  # Machine-readable per-job report
  pdfmill ./input -o ./output --json > report.json

BACKENDS:
  Backend    Wraps                      Output layout
  ─────────  ─────────────────────────  ─────────────────────────────
  extract    pdf-extract crate          <out>/<stem>.md
  command    magic-pdf (or --tool)      <out>/<stem>/auto/<stem>.md
  api        parse-to-Markdown REST     <out>/<stem>.md

EXIT STATUS:
  0  every job succeeded or was skipped
  1  at least one job failed (per-job details in the report and batch log)

ENVIRONMENT VARIABLES:
  PDFMILL_APP_ID        x-app-id header for the api backend
  PDFMILL_SECRET_CODE   x-secret-code header for the api backend
  Most flags also read a PDFMILL_* variable — see each flag's help.

LOGS:
  One append-mode log file per batch directory (default ./logs/batch.log)
  carries timestamped, job-tagged lines from every worker; the command
  backend additionally redirects tool stdout/stderr into it.
"#;

/// Batch-convert a folder of PDF documents to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "pdfmill",
    version,
    about = "Batch-convert folders of PDF documents to Markdown",
    long_about = "Convert every PDF in a directory to Markdown by driving an external \
converter: the in-process pdf-extract crate, a document-parsing CLI tool such as magic-pdf, \
or a hosted parse API. pdfmill adds the batch plumbing — a bounded worker pool, GPU \
round-robin, skip-if-already-converted, artifact cleanup, and a shared batch log.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the input PDF files.
    input_dir: PathBuf,

    /// Directory receiving the Markdown outputs.
    #[arg(short, long, env = "PDFMILL_OUTPUT", default_value = "./output")]
    output: PathBuf,

    /// Directory receiving the batch log file.
    #[arg(long, env = "PDFMILL_LOG_DIR", default_value = "./logs")]
    log_dir: PathBuf,

    /// Converter backend: extract, command, api.
    #[arg(short, long, env = "PDFMILL_BACKEND", value_enum, default_value = "extract")]
    backend: BackendArg,

    /// Maximum number of concurrent conversion jobs.
    #[arg(short, long, env = "PDFMILL_WORKERS", default_value_t = 4)]
    workers: usize,

    /// Spread jobs round-robin across this many GPU devices (command
    /// backend; 0 disables pinning).
    #[arg(long, env = "PDFMILL_DEVICES", default_value_t = 0)]
    devices: usize,

    /// Input file-name suffix filter.
    #[arg(long, env = "PDFMILL_SUFFIX", default_value = ".pdf")]
    suffix: String,

    /// Pre-existing outputs at least this many bytes are skipped;
    /// smaller ones are treated as truncated and reconverted.
    #[arg(long, env = "PDFMILL_MIN_OUTPUT_BYTES", default_value_t = 1024)]
    min_output_bytes: u64,

    /// Executable for the command backend.
    #[arg(long, env = "PDFMILL_TOOL", default_value = "magic-pdf")]
    tool: String,

    /// Value for the command backend's -m flag.
    #[arg(long, env = "PDFMILL_TOOL_MODE", default_value = "auto")]
    tool_mode: String,

    /// Endpoint for the api backend.
    #[arg(
        long,
        env = "PDFMILL_API_URL",
        default_value = "https://api.textin.com/ai/service/v1/pdf_to_markdown"
    )]
    api_url: String,

    /// x-app-id credential for the api backend.
    #[arg(long, env = "PDFMILL_APP_ID")]
    app_id: Option<String>,

    /// x-secret-code credential for the api backend.
    #[arg(long, env = "PDFMILL_SECRET_CODE")]
    secret_code: Option<String>,

    /// Total request timeout for api calls, in seconds (unset: no timeout).
    #[arg(long, env = "PDFMILL_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Password for encrypted PDFs (api backend).
    #[arg(long, env = "PDFMILL_PDF_PASSWORD")]
    pdf_password: Option<String>,

    /// Rasterisation DPI the api backend applies to scanned pages.
    #[arg(long, env = "PDFMILL_DPI", default_value_t = 72)]
    dpi: u32,

    /// First page to parse, 1-indexed (api backend).
    #[arg(long, env = "PDFMILL_PAGE_START", default_value_t = 1)]
    page_start: u32,

    /// Number of pages to parse from --page-start (api backend).
    #[arg(long, env = "PDFMILL_PAGE_COUNT", default_value_t = 2000)]
    page_count: u32,

    /// Disable heading-hierarchy inference (api backend).
    #[arg(long, env = "PDFMILL_NO_DOCUMENT_TREE")]
    no_document_tree: bool,

    /// Include per-element detail blocks in the Markdown (api backend).
    #[arg(long, env = "PDFMILL_MARKDOWN_DETAILS")]
    markdown_details: bool,

    /// Table rendering: md or html (api backend).
    #[arg(long, env = "PDFMILL_TABLE_FLAVOR", default_value = "md")]
    table_flavor: String,

    /// Extracted images to return: none, page, objects, both (api backend).
    #[arg(long, env = "PDFMILL_GET_IMAGE", default_value = "none")]
    get_image: String,

    /// Parse mode: auto or scan (api backend).
    #[arg(long, env = "PDFMILL_PARSE_MODE", default_value = "auto")]
    parse_mode: String,

    /// Output the full report as JSON instead of human-readable lines.
    #[arg(long, env = "PDFMILL_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFMILL_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFMILL_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFMILL_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum BackendArg {
    Extract,
    Command,
    Api,
}

impl From<BackendArg> for BackendKind {
    fn from(v: BackendArg) -> Self {
        match v {
            BackendArg::Extract => BackendKind::Extract,
            BackendArg::Command => BackendKind::Command,
            BackendArg::Api => BackendKind::Api,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar and the batch log provide all the feedback that matters.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).context("Invalid configuration")?;

    // ── Run batch ────────────────────────────────────────────────────────
    let report = run_batch(&config).await.context("Batch failed to run")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        // Only print inline results when the progress callback is disabled
        // (the callback already printed the per-job lines).
        for job in &report.results {
            println!("{}: {} ({}ms)  {}", job.file, job.status, job.duration_ms, job.message);
        }
        eprintln!(
            "Converted {}/{} files, {} skipped, {} failed in {}ms",
            report.stats.succeeded,
            report.stats.total,
            report.stats.skipped,
            report.stats.failed,
            report.stats.total_duration_ms
        );
    }

    // Any failed job surfaces as a non-zero exit so schedulers and shell
    // scripts can tell a clean batch from a degraded one.
    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

/// Map CLI args to `BatchConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<BatchConfig> {
    let api_params = ApiParams {
        pdf_pwd: cli.pdf_password.clone().unwrap_or_default(),
        dpi: cli.dpi,
        page_start: cli.page_start,
        page_count: cli.page_count,
        apply_document_tree: !cli.no_document_tree,
        markdown_details: cli.markdown_details,
        table_flavor: cli.table_flavor.clone(),
        get_image: cli.get_image.clone(),
        parse_mode: cli.parse_mode.clone(),
    };

    let mut builder = BatchConfig::builder()
        .input_dir(&cli.input_dir)
        .output_dir(&cli.output)
        .log_dir(&cli.log_dir)
        .suffix(&cli.suffix)
        .workers(cli.workers)
        .device_count(cli.devices)
        .min_output_bytes(cli.min_output_bytes)
        .backend(cli.backend.clone().into())
        .tool(&cli.tool)
        .tool_mode(&cli.tool_mode)
        .api_url(&cli.api_url)
        .api_params(api_params);

    if let (Some(app_id), Some(secret)) = (&cli.app_id, &cli.secret_code) {
        builder = builder.credentials(app_id, secret);
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress(cb);
    }

    Ok(builder.build()?)
}
