//! Input enumeration: list the files a batch will convert.
//!
//! Returns entries in directory-listing order — no sorting is applied, so
//! ordering is whatever the platform's directory iteration yields. Device
//! round-robin keys off this order; reruns on the same filesystem see the
//! same sequence in practice, but nothing depends on it being stable.

use crate::error::PdfmillError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// List regular files in `dir` whose name ends with `suffix`
/// (case-insensitive).
///
/// Read-only: no side effects. Fails only when the directory itself is
/// missing or unlistable; unreadable individual entries are skipped.
pub fn list_inputs(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, PdfmillError> {
    let entries = std::fs::read_dir(dir).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            PdfmillError::InputDirNotFound {
                path: dir.to_path_buf(),
            }
        } else {
            PdfmillError::InputDirUnreadable {
                path: dir.to_path_buf(),
                source,
            }
        }
    })?;

    let suffix = suffix.to_lowercase();
    let mut files = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase().ends_with(&suffix))
            .unwrap_or(false);
        if matches {
            files.push(path);
        }
    }

    debug!("Enumerated {} '{}' files in {}", files.len(), suffix, dir.display());
    Ok(files)
}
