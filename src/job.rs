//! Job planning: one [`Job`] per enumerated input file.
//!
//! A job is immutable once planned and consumed exactly once by the
//! dispatcher. The expected output path is computed up front (it depends
//! only on the backend's layout) so the idempotency check can run before
//! any converter work starts.

use crate::backend::Converter;
use std::path::{Path, PathBuf};

/// One input-PDF-to-output-Markdown conversion task.
#[derive(Debug, Clone)]
pub struct Job {
    /// Absolute or config-relative path of the source file.
    pub source: PathBuf,
    /// Device identifier assigned round-robin at planning time, or `None`
    /// when device pinning is disabled.
    pub device: Option<u32>,
    /// Where the backend will leave the Markdown output. Probed by the
    /// idempotency check; its parent directory holds any intermediates.
    pub expected_output: PathBuf,
}

impl Job {
    /// The source file name, used to tag log lines and results.
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }

    /// Directory the backend works in for this job — the parent of the
    /// expected output, where intermediates accumulate.
    pub fn work_dir(&self) -> &Path {
        self.expected_output.parent().unwrap_or(Path::new("."))
    }
}

/// Plan one job per input file.
///
/// Device assignment is round-robin by enumeration index: job *i* gets
/// device `i % device_count`. With `device_count == 0` no device is
/// assigned.
pub fn plan_jobs(files: &[PathBuf], converter: &dyn Converter, device_count: usize) -> Vec<Job> {
    files
        .iter()
        .enumerate()
        .map(|(i, source)| Job {
            source: source.clone(),
            device: (device_count > 0).then(|| (i % device_count) as u32),
            expected_output: converter.output_path(source),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ExtractConverter;

    fn fixture_files() -> Vec<PathBuf> {
        ["a.pdf", "b.pdf", "c.pdf", "d.pdf"]
            .iter()
            .map(|f| PathBuf::from("/in").join(f))
            .collect()
    }

    #[test]
    fn round_robin_device_assignment() {
        let converter = ExtractConverter::new("/out");
        let jobs = plan_jobs(&fixture_files(), &converter, 2);
        let devices: Vec<Option<u32>> = jobs.iter().map(|j| j.device).collect();
        assert_eq!(devices, vec![Some(0), Some(1), Some(0), Some(1)]);
    }

    #[test]
    fn zero_devices_means_no_assignment() {
        let converter = ExtractConverter::new("/out");
        let jobs = plan_jobs(&fixture_files(), &converter, 0);
        assert!(jobs.iter().all(|j| j.device.is_none()));
    }

    #[test]
    fn expected_output_follows_backend_layout() {
        let converter = ExtractConverter::new("/out");
        let jobs = plan_jobs(&fixture_files(), &converter, 0);
        assert_eq!(jobs[0].expected_output, PathBuf::from("/out/a.md"));
        assert_eq!(jobs[0].work_dir(), Path::new("/out"));
    }

    #[test]
    fn file_name_for_logging() {
        let converter = ExtractConverter::new("/out");
        let jobs = plan_jobs(&fixture_files(), &converter, 0);
        assert_eq!(jobs[1].file_name(), "b.pdf");
    }
}
