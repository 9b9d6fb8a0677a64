//! Scoped ownership of request files.

use std::io::ErrorKind;
use std::mem;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::manager::{CleanupManager, CleanupReport};

/// Owns the files of one request until they are released.
///
/// Call [`release`](Self::release) on every normal exit path. If the guard
/// is dropped first (cancelled future, aborted download, panic), the
/// remaining files are removed synchronously in `Drop`.
#[derive(Debug, Default)]
pub struct CleanupGuard {
    outputs: Vec<PathBuf>,
    sources: Vec<PathBuf>,
}

impl CleanupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A guard that already owns the given source files.
    pub fn for_sources(sources: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            outputs: Vec::new(),
            sources: sources.into_iter().collect(),
        }
    }

    pub fn track_source(&mut self, path: PathBuf) {
        self.sources.push(path);
    }

    pub fn track_output(&mut self, path: PathBuf) {
        self.outputs.push(path);
    }

    pub fn track_outputs(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        self.outputs.extend(paths);
    }

    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty() && self.sources.is_empty()
    }

    /// Moves all tracked paths of `other` into this guard.
    pub fn absorb(&mut self, mut other: CleanupGuard) {
        self.outputs.append(&mut other.outputs);
        self.sources.append(&mut other.sources);
    }

    /// Deletes every tracked file.
    pub async fn release(mut self) -> CleanupReport {
        let outputs = mem::take(&mut self.outputs);
        let sources = mem::take(&mut self.sources);
        CleanupManager::release(&outputs, &sources).await
    }

    /// Gives up ownership without deleting anything.
    pub fn disarm(mut self) -> (Vec<PathBuf>, Vec<PathBuf>) {
        (
            mem::take(&mut self.outputs),
            mem::take(&mut self.sources),
        )
    }
}

/// Fallback path only: deletes synchronously, blocking the current thread.
impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if self.is_empty() {
            return;
        }
        debug!(
            outputs = self.outputs.len(),
            sources = self.sources.len(),
            "Releasing unreleased request files"
        );
        CleanupManager::release_blocking(&self.outputs, &self.sources);
    }
}

/// An intermediate file that only bridges two steps of one conversion.
///
/// [`discard`](Self::discard) deletes it; dropping it undiscarded deletes
/// it too.
#[derive(Debug)]
pub struct TempArtifact {
    path: Option<PathBuf>,
}

impl TempArtifact {
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Keeps the file and returns its path.
    pub fn persist(mut self) -> PathBuf {
        self.path.take().unwrap_or_default()
    }

    pub async fn discard(mut self) {
        if let Some(path) = self.path.take() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!(path = %path.display(), "Removed intermediate file"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove intermediate file")
                }
            }
        }
    }
}

/// Same blocking fallback as [`CleanupGuard`], for one file.
impl Drop for TempArtifact {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            CleanupManager::release_blocking(&[path], &[]);
        }
    }
}
