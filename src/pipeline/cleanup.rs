//! Best-effort removal of known intermediate artifacts.
//!
//! Conversion tools can leave working files (`spans.pdf`, `layout.pdf`,
//! `origin.pdf` for `magic-pdf`) beside each output. They are deleted
//! before conversion, so a rerun never trips over stale artifacts, and
//! again after a successful conversion. A failed deletion is logged and
//! swallowed — cleanup never fails a job.

use crate::logsink::BatchLog;
use std::path::Path;

/// Delete each named file that exists in `dir`, logging every deletion
/// under the `job` tag. Idempotent: files already gone are ignored.
pub fn clear_intermediates(dir: &Path, names: &[String], log: &BatchLog, job: &str) {
    for name in names {
        let path = dir.join(name);
        if !path.is_file() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => log.info(job, format!("deleted intermediate {}", path.display())),
            Err(e) => log.warn(
                job,
                format!("could not delete intermediate {}: {e}", path.display()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names() -> Vec<String> {
        vec!["spans.pdf".into(), "layout.pdf".into(), "origin.pdf".into()]
    }

    fn open_log(dir: &Path) -> BatchLog {
        BatchLog::open(&dir.join("batch.log")).unwrap()
    }

    #[test]
    fn removes_listed_files_and_logs() {
        let dir = TempDir::new().unwrap();
        let work = dir.path().join("work");
        std::fs::create_dir(&work).unwrap();
        std::fs::write(work.join("spans.pdf"), b"x").unwrap();
        std::fs::write(work.join("layout.pdf"), b"x").unwrap();
        std::fs::write(work.join("keep.md"), b"x").unwrap();
        let log = open_log(dir.path());

        clear_intermediates(&work, &names(), &log, "a.pdf");

        assert!(!work.join("spans.pdf").exists());
        assert!(!work.join("layout.pdf").exists());
        assert!(work.join("keep.md").exists());

        let text = std::fs::read_to_string(dir.path().join("batch.log")).unwrap();
        assert!(text.contains("deleted intermediate"));
        assert!(text.contains("spans.pdf"));
    }

    #[test]
    fn second_call_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let work = dir.path().join("work");
        std::fs::create_dir(&work).unwrap();
        std::fs::write(work.join("origin.pdf"), b"x").unwrap();
        let log = open_log(dir.path());

        clear_intermediates(&work, &names(), &log, "a.pdf");
        clear_intermediates(&work, &names(), &log, "a.pdf");

        let text = std::fs::read_to_string(dir.path().join("batch.log")).unwrap();
        let deletions = text.matches("deleted intermediate").count();
        assert_eq!(deletions, 1, "second pass must delete nothing");
    }

    #[test]
    fn missing_directory_does_not_panic() {
        let dir = TempDir::new().unwrap();
        let log = open_log(dir.path());
        clear_intermediates(&dir.path().join("nope"), &names(), &log, "a.pdf");
    }
}
