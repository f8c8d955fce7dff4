//! Subprocess backend: one external tool invocation per job.
//!
//! Spawns `<tool> -p <input> -o <output_dir> -m <mode>` and judges success
//! purely by exit code — the tool's stdout/stderr are redirected into the
//! shared batch log and never inspected. When the job carries a device
//! assignment, `CUDA_VISIBLE_DEVICES` is set on the child only, so
//! concurrent jobs pin to different GPUs without touching the parent
//! process environment.

use crate::backend::{stem, Converter};
use crate::config::BatchConfig;
use crate::error::JobError;
use crate::job::Job;
use crate::logsink::BatchLog;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Converter that shells out to a document-parsing CLI (`magic-pdf` by
/// default).
pub struct CommandConverter {
    tool: String,
    mode: String,
    output_dir: PathBuf,
    intermediates: Vec<String>,
}

impl CommandConverter {
    pub fn new(
        tool: impl Into<String>,
        mode: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        intermediates: Vec<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            mode: mode.into(),
            output_dir: output_dir.into(),
            intermediates,
        }
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(
            &config.tool,
            &config.tool_mode,
            &config.output_dir,
            config.intermediate_files.clone(),
        )
    }
}

#[async_trait]
impl Converter for CommandConverter {
    fn name(&self) -> &'static str {
        "command"
    }

    /// The tool writes `<output_dir>/<stem>/auto/<stem>.md`; intermediates
    /// accumulate in the same `auto` directory.
    fn output_path(&self, source: &Path) -> PathBuf {
        let stem = stem(source);
        self.output_dir
            .join(&stem)
            .join("auto")
            .join(format!("{stem}.md"))
    }

    fn intermediate_files(&self) -> &[String] {
        &self.intermediates
    }

    async fn convert(&self, job: &Job, log: &BatchLog) -> Result<(), JobError> {
        // Both channels append to the batch log, between our own lines.
        let stdout = log
            .raw_handle()
            .map_err(|source| JobError::LogRedirect { source })?;
        let stderr = stdout
            .try_clone()
            .map_err(|source| JobError::LogRedirect { source })?;

        let mut cmd = Command::new(&self.tool);
        cmd.arg("-p")
            .arg(&job.source)
            .arg("-o")
            .arg(&self.output_dir)
            .arg("-m")
            .arg(&self.mode)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));

        if let Some(device) = job.device {
            cmd.env("CUDA_VISIBLE_DEVICES", device.to_string());
        }

        debug!(
            "Spawning {} -p {} -o {} -m {}",
            self.tool,
            job.source.display(),
            self.output_dir.display(),
            self.mode
        );

        let status = cmd.status().await.map_err(|source| JobError::SpawnFailed {
            tool: self.tool.clone(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(JobError::ToolFailed {
                tool: self.tool.clone(),
                code: status.code(),
            })
        }
    }
}
