//! Configuration types for batch PDF-to-Markdown conversion.
//!
//! All batch behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across tasks, log them, and diff two runs to understand
//! why their outcomes differ.
//!
//! Validation happens once, in [`BatchConfigBuilder::build`]: a batch that
//! would fail halfway through (remote backend with no credentials, zero
//! workers) is rejected up front with
//! [`crate::error::PdfmillError::InvalidConfig`] instead of surfacing later
//! as a pile of failed jobs.

use crate::backend::Converter;
use crate::error::PdfmillError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Name of the shared batch log file created under `log_dir`.
pub const BATCH_LOG_FILE: &str = "batch.log";

/// Configuration for one batch conversion run.
///
/// Built via [`BatchConfig::builder()`] or using [`BatchConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfmill::{BackendKind, BatchConfig};
///
/// let config = BatchConfig::builder()
///     .input_dir("./input")
///     .output_dir("./output")
///     .workers(4)
///     .backend(BackendKind::Command)
///     .device_count(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Directory scanned for input files. Default: `./input`.
    pub input_dir: PathBuf,

    /// Directory receiving one Markdown file (or one `<stem>/auto/`
    /// subtree, for the subprocess backend) per input. Created if missing.
    /// Default: `./output`.
    pub output_dir: PathBuf,

    /// Directory receiving the shared batch log file. Default: `./logs`.
    pub log_dir: PathBuf,

    /// Input file-name suffix filter, matched case-insensitively.
    /// Must start with a dot. Default: `.pdf`.
    pub suffix: String,

    /// Maximum number of jobs converted concurrently. Default: 4.
    ///
    /// Each worker runs one job to completion; a hung tool or API call
    /// occupies its worker until it returns (no per-job timeout is
    /// enforced). Size the pool to the external resource: GPU count for
    /// the subprocess backend, API rate limits for the remote backend.
    pub workers: usize,

    /// Number of device identifiers to spread jobs across, round-robin by
    /// enumeration index. 0 disables device pinning. Default: 0.
    ///
    /// Only the subprocess backend consumes the assignment (it sets
    /// `CUDA_VISIBLE_DEVICES` on the child); the other backends ignore it.
    pub device_count: usize,

    /// Minimum byte size for a pre-existing output file to count as
    /// complete. Default: 1024.
    ///
    /// Outputs below the threshold are treated as truncated leftovers from
    /// a crashed run and reconverted. The 1 KiB default is inherited from
    /// prior operational use; raise it if your documents never legitimately
    /// produce tiny Markdown.
    pub min_output_bytes: u64,

    /// Which converter backend drives each job. Default: [`BackendKind::Extract`].
    pub backend: BackendKind,

    /// Executable name for the subprocess backend. Default: `magic-pdf`.
    pub tool: String,

    /// Value passed to the subprocess tool's `-m` flag. Default: `auto`.
    pub tool_mode: String,

    /// Intermediate artifact file names the subprocess tool leaves in each
    /// job's output directory, deleted best-effort before conversion and
    /// after a successful one.
    pub intermediate_files: Vec<String>,

    /// Remote API endpoint for the [`BackendKind::Api`] backend.
    pub api_url: String,

    /// `x-app-id` header value. Required when `backend` is `Api`.
    pub app_id: Option<String>,

    /// `x-secret-code` header value. Required when `backend` is `Api`.
    pub secret_code: Option<String>,

    /// Per-request parse parameters sent as query parameters by the
    /// remote backend.
    pub api_params: ApiParams,

    /// Total request timeout for remote calls, in seconds. `None` means no
    /// timeout — a stalled upload blocks its worker indefinitely, matching
    /// the subprocess backend's behaviour. Default: `None`.
    pub api_timeout_secs: Option<u64>,

    /// Pre-constructed converter. Takes precedence over `backend`.
    ///
    /// The injection point used by tests and by callers that need a
    /// backend pdfmill doesn't ship (an in-house converter, a mock).
    pub converter: Option<Arc<dyn Converter>>,

    /// Progress callback receiving per-job completion events.
    pub progress: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./input"),
            output_dir: PathBuf::from("./output"),
            log_dir: PathBuf::from("./logs"),
            suffix: ".pdf".to_string(),
            workers: 4,
            device_count: 0,
            min_output_bytes: 1024,
            backend: BackendKind::default(),
            tool: "magic-pdf".to_string(),
            tool_mode: "auto".to_string(),
            intermediate_files: default_intermediate_files(),
            api_url: "https://api.textin.com/ai/service/v1/pdf_to_markdown".to_string(),
            app_id: None,
            secret_code: None,
            api_params: ApiParams::default(),
            api_timeout_secs: None,
            converter: None,
            progress: None,
        }
    }
}

/// Artifact files `magic-pdf` is known to leave beside each output.
fn default_intermediate_files() -> Vec<String> {
    ["spans.pdf", "layout.pdf", "origin.pdf"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("log_dir", &self.log_dir)
            .field("suffix", &self.suffix)
            .field("workers", &self.workers)
            .field("device_count", &self.device_count)
            .field("min_output_bytes", &self.min_output_bytes)
            .field("backend", &self.backend)
            .field("tool", &self.tool)
            .field("tool_mode", &self.tool_mode)
            .field("api_url", &self.api_url)
            .field("app_id", &self.app_id.as_ref().map(|_| "<set>"))
            .field("secret_code", &self.secret_code.as_ref().map(|_| "<set>"))
            .field("api_params", &self.api_params)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("converter", &self.converter.as_ref().map(|c| c.name()))
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// Path of the shared batch log file.
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(BATCH_LOG_FILE)
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = dir.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.suffix = suffix.into();
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.config.workers = n.max(1);
        self
    }

    pub fn device_count(mut self, n: usize) -> Self {
        self.config.device_count = n;
        self
    }

    pub fn min_output_bytes(mut self, bytes: u64) -> Self {
        self.config.min_output_bytes = bytes;
        self
    }

    pub fn backend(mut self, kind: BackendKind) -> Self {
        self.config.backend = kind;
        self
    }

    pub fn tool(mut self, tool: impl Into<String>) -> Self {
        self.config.tool = tool.into();
        self
    }

    pub fn tool_mode(mut self, mode: impl Into<String>) -> Self {
        self.config.tool_mode = mode.into();
        self
    }

    pub fn intermediate_files(mut self, names: Vec<String>) -> Self {
        self.config.intermediate_files = names;
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn credentials(
        mut self,
        app_id: impl Into<String>,
        secret_code: impl Into<String>,
    ) -> Self {
        self.config.app_id = Some(app_id.into());
        self.config.secret_code = Some(secret_code.into());
        self
    }

    pub fn api_params(mut self, params: ApiParams) -> Self {
        self.config.api_params = params;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.config.converter = Some(converter);
        self
    }

    pub fn progress(mut self, callback: ProgressCallback) -> Self {
        self.config.progress = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, PdfmillError> {
        let c = &self.config;
        if c.workers == 0 {
            return Err(PdfmillError::InvalidConfig("Workers must be ≥ 1".into()));
        }
        if c.suffix.is_empty() || !c.suffix.starts_with('.') {
            return Err(PdfmillError::InvalidConfig(format!(
                "Suffix must start with '.', got '{}'",
                c.suffix
            )));
        }
        if c.backend == BackendKind::Api && c.converter.is_none() {
            if c.api_url.is_empty() {
                return Err(PdfmillError::InvalidConfig(
                    "API backend requires a non-empty api_url".into(),
                ));
            }
            let missing = c.app_id.as_deref().unwrap_or("").is_empty()
                || c.secret_code.as_deref().unwrap_or("").is_empty();
            if missing {
                return Err(PdfmillError::InvalidConfig(
                    "API backend requires app_id and secret_code credentials".into(),
                ));
            }
        }
        if c.backend == BackendKind::Command && c.converter.is_none() && c.tool.is_empty() {
            return Err(PdfmillError::InvalidConfig(
                "Command backend requires a non-empty tool name".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which converter implementation drives each job.
///
/// All three wrap third-party conversion logic; pdfmill contributes only
/// the orchestration around them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendKind {
    /// In-process text extraction via the `pdf-extract` crate. No external
    /// tool, no credentials, no network. (default)
    #[default]
    Extract,
    /// Out-of-process CLI tool (`magic-pdf` by default), one spawn per job.
    Command,
    /// Remote REST API: one synchronous POST of the raw PDF bytes per job.
    Api,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BackendKind::Extract => "extract",
            BackendKind::Command => "command",
            BackendKind::Api => "api",
        };
        f.write_str(s)
    }
}

/// Per-request parse parameters for the remote API backend.
///
/// Sent verbatim as URL query parameters. Defaults mirror the service's
/// documented defaults; the 2000-page window is the service-side maximum
/// and means "whole document" for anything shorter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiParams {
    /// Password for encrypted PDFs. Empty means unencrypted.
    pub pdf_pwd: String,
    /// Rasterisation DPI used by the service for scanned pages.
    pub dpi: u32,
    /// First page to parse (1-indexed).
    pub page_start: u32,
    /// Number of pages to parse from `page_start`.
    pub page_count: u32,
    /// Ask the service to infer a heading hierarchy.
    pub apply_document_tree: bool,
    /// Include per-element detail blocks in the Markdown.
    pub markdown_details: bool,
    /// Table rendering: `md` or `html`.
    pub table_flavor: String,
    /// Which extracted images to return: `none`, `page`, `objects`, `both`.
    pub get_image: String,
    /// `auto` chooses between text-layer and OCR parsing; `scan` forces OCR.
    pub parse_mode: String,
}

impl Default for ApiParams {
    fn default() -> Self {
        Self {
            pdf_pwd: String::new(),
            dpi: 72,
            page_start: 1,
            page_count: 2000,
            apply_document_tree: true,
            markdown_details: false,
            table_flavor: "md".to_string(),
            get_image: "none".to_string(),
            parse_mode: "auto".to_string(),
        }
    }
}

impl ApiParams {
    /// Render the parameters as query pairs, booleans as `1`/`0`.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        fn flag(b: bool) -> String {
            if b { "1" } else { "0" }.to_string()
        }
        vec![
            ("pdf_pwd", self.pdf_pwd.clone()),
            ("dpi", self.dpi.to_string()),
            ("page_start", self.page_start.to_string()),
            ("page_count", self.page_count.to_string()),
            ("apply_document_tree", flag(self.apply_document_tree)),
            ("markdown_details", flag(self.markdown_details)),
            ("table_flavor", self.table_flavor.clone()),
            ("get_image", self.get_image.clone()),
            ("parse_mode", self.parse_mode.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = BatchConfig::default();
        assert_eq!(c.workers, 4);
        assert_eq!(c.device_count, 0);
        assert_eq!(c.min_output_bytes, 1024);
        assert_eq!(c.suffix, ".pdf");
        assert_eq!(c.backend, BackendKind::Extract);
        assert_eq!(c.intermediate_files.len(), 3);
        assert!(c.log_file().ends_with("batch.log"));
    }

    #[test]
    fn builder_clamps_workers() {
        let c = BatchConfig::builder().workers(0).build().unwrap();
        assert_eq!(c.workers, 1);
    }

    #[test]
    fn api_backend_requires_credentials() {
        let err = BatchConfig::builder()
            .backend(BackendKind::Api)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("credentials"), "got: {err}");
    }

    #[test]
    fn api_backend_with_credentials_builds() {
        let c = BatchConfig::builder()
            .backend(BackendKind::Api)
            .credentials("app", "secret")
            .build()
            .unwrap();
        assert_eq!(c.app_id.as_deref(), Some("app"));
    }

    #[test]
    fn suffix_must_start_with_dot() {
        let err = BatchConfig::builder().suffix("pdf").build().unwrap_err();
        assert!(err.to_string().contains("Suffix"), "got: {err}");
    }

    #[test]
    fn api_params_query_encoding() {
        let params = ApiParams::default();
        let query = params.to_query();
        let get = |k: &str| query.iter().find(|(key, _)| *key == k).unwrap().1.clone();
        assert_eq!(get("dpi"), "72");
        assert_eq!(get("page_start"), "1");
        assert_eq!(get("page_count"), "2000");
        assert_eq!(get("apply_document_tree"), "1");
        assert_eq!(get("markdown_details"), "0");
        assert_eq!(get("table_flavor"), "md");
        assert_eq!(get("get_image"), "none");
        assert_eq!(get("parse_mode"), "auto");
    }

    #[test]
    fn backend_kind_display() {
        assert_eq!(BackendKind::Extract.to_string(), "extract");
        assert_eq!(BackendKind::Command.to_string(), "command");
        assert_eq!(BackendKind::Api.to_string(), "api");
    }
}
