//! The shared batch log: one append-mode file, plain timestamped lines
//! tagged with the job they belong to.
//!
//! Every job writes to the same sink through a process-wide mutex, so
//! lines from concurrent jobs interleave at line granularity instead of
//! relying on append-mode ordering. The subprocess backend additionally
//! redirects tool stdout/stderr into the same file via [`BatchLog::raw_handle`],
//! keeping all diagnostics for a run in one place.
//!
//! Log writes are best-effort: a full disk must not fail a conversion
//! that otherwise succeeded, so write errors are swallowed after the
//! file has been opened. Only [`BatchLog::open`] is fallible.

use crate::error::PdfmillError;
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Cheaply cloneable handle to the shared batch log file.
#[derive(Clone)]
pub struct BatchLog {
    file: Arc<Mutex<File>>,
}

impl BatchLog {
    /// Open (or create) the log file in append mode, creating parent
    /// directories as needed.
    pub fn open(path: &Path) -> Result<Self, PdfmillError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PdfmillError::LogOpenFailed {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| PdfmillError::LogOpenFailed {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn info(&self, job: &str, msg: impl AsRef<str>) {
        self.line("INFO", job, msg.as_ref());
    }

    pub fn warn(&self, job: &str, msg: impl AsRef<str>) {
        self.line("WARN", job, msg.as_ref());
    }

    pub fn error(&self, job: &str, msg: impl AsRef<str>) {
        self.line("ERROR", job, msg.as_ref());
    }

    fn line(&self, level: &str, job: &str, msg: &str) {
        let ts = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{ts} {level:<5} [{job}] {msg}");
        }
    }

    /// Duplicate the underlying file handle, for handing to a subprocess
    /// as its stdout/stderr. The duplicate shares the append-mode cursor,
    /// so tool output lands between the surrounding log lines.
    pub fn raw_handle(&self) -> std::io::Result<File> {
        let file = self
            .file
            .lock()
            .map_err(|_| std::io::Error::other("batch log mutex poisoned"))?;
        file.try_clone()
    }
}
