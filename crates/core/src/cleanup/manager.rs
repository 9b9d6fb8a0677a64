//! Deletion of request files.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::metrics::CLEANUP_FAILURES;

/// Outcome of a cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Files deleted by this pass.
    pub removed: usize,
    /// Files that were already gone.
    pub missing: usize,
    /// Files that could not be deleted, with the reason.
    pub errors: Vec<String>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn record(&mut self, path: &Path, result: std::io::Result<()>) {
        match result {
            Ok(()) => self.removed += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Already removed");
                self.missing += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to remove file");
                CLEANUP_FAILURES.inc();
                self.errors
                    .push(format!("Failed to remove {}: {}", path.display(), e));
            }
        }
    }
}

/// Deletes the files of a finished request.
pub struct CleanupManager;

impl CleanupManager {
    /// Deletes every path in both sets. Individual failures are logged and
    /// reported, never returned as errors.
    pub async fn release(outputs: &[PathBuf], sources: &[PathBuf]) -> CleanupReport {
        let mut report = CleanupReport::default();
        let mut seen = HashSet::new();
        for path in outputs.iter().chain(sources) {
            if !seen.insert(path) {
                continue;
            }
            let result = fs::remove_file(path).await;
            report.record(path, result);
        }
        debug!(
            removed = report.removed,
            missing = report.missing,
            failed = report.errors.len(),
            "Cleanup finished"
        );
        report
    }

    /// Blocking variant for contexts that cannot await, such as `Drop`.
    ///
    /// Runs `std::fs::remove_file` on the calling thread, which may be a
    /// tokio worker. A request owns at most a few dozen files, so this is a
    /// short stall; normal exits go through the async [`release`](Self::release).
    pub fn release_blocking(outputs: &[PathBuf], sources: &[PathBuf]) -> CleanupReport {
        let mut report = CleanupReport::default();
        let mut seen = HashSet::new();
        for path in outputs.iter().chain(sources) {
            if !seen.insert(path) {
                continue;
            }
            let result = std::fs::remove_file(path);
            report.record(path, result);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_release_removes_all() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out.png");
        let src = temp.path().join("src.jpg");
        fs::write(&out, b"o").await.unwrap();
        fs::write(&src, b"s").await.unwrap();

        let report = CleanupManager::release(&[out.clone()], &[src.clone()]).await;
        assert_eq!(report.removed, 2);
        assert!(report.is_clean());
        assert!(!out.exists());
        assert!(!src.exists());
    }

    #[tokio::test]
    async fn test_release_tolerates_missing_and_duplicates() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out.png");
        fs::write(&out, b"o").await.unwrap();
        let gone = temp.path().join("never-created.txt");

        let report =
            CleanupManager::release(&[out.clone(), out.clone()], &[gone.clone()]).await;
        assert_eq!(report.removed, 1);
        assert_eq!(report.missing, 1);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_release_reports_failures_without_stopping() {
        let temp = TempDir::new().unwrap();
        // A directory cannot be removed with remove_file.
        let dir = temp.path().join("a-directory");
        fs::create_dir(&dir).await.unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, b"x").await.unwrap();

        let report = CleanupManager::release(&[dir.clone(), file.clone()], &[]).await;
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.removed, 1);
        assert!(!file.exists());
    }

    #[test]
    fn test_release_blocking() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        std::fs::write(&file, b"x").unwrap();

        let report = CleanupManager::release_blocking(&[], &[file.clone()]);
        assert_eq!(report.removed, 1);
        assert!(!file.exists());
    }
}
