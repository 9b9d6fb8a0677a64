//! Batch data types.

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::naming;
use crate::cleanup::CleanupGuard;
use crate::convert::{ConversionStrategy, OutputSet};

/// A file accepted from the client and already stored in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    /// Name the client sent.
    pub original_name: String,
    /// Where the bytes were written.
    pub path: PathBuf,
}

impl UploadedFile {
    pub fn new(original_name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            original_name: original_name.into(),
            path,
        }
    }

    /// Lower-cased extension of the original name, falling back to the
    /// stored path.
    pub fn extension(&self) -> String {
        let ext = naming::extension_of(&self.original_name);
        if !ext.is_empty() {
            return ext;
        }
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

/// One planned conversion within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionRequest {
    pub original_name: String,
    pub source_path: PathBuf,
    pub source_ext: String,
    pub target_path: PathBuf,
    pub target_ext: String,
    pub strategy: ConversionStrategy,
}

/// Outputs of a successful batch, still owned by its cleanup guard.
#[derive(Debug)]
pub struct BatchResult {
    pub(crate) outputs: Vec<OutputSet>,
    pub(crate) guard: CleanupGuard,
}

impl BatchResult {
    /// Output sets in upload order.
    pub fn outputs(&self) -> &[OutputSet] {
        &self.outputs
    }

    /// Every output file, in upload order then page order.
    pub fn output_paths(&self) -> Vec<PathBuf> {
        self.outputs
            .iter()
            .flat_map(|set| set.paths().iter().cloned())
            .collect()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.iter().map(OutputSet::len).sum()
    }

    /// Uploaded files the batch consumed.
    pub fn sources(&self) -> &[PathBuf] {
        self.guard.sources()
    }

    /// Deletes every file of the batch without delivering it.
    pub async fn discard(self) {
        self.guard.release().await;
    }
}

/// How a batch result reaches the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Exactly one output: sent as-is.
    Single { path: PathBuf, file_name: String },
    /// Several outputs bundled into one ZIP.
    Archive {
        path: PathBuf,
        file_name: String,
        entries: usize,
    },
}

impl Delivery {
    pub fn path(&self) -> &Path {
        match self {
            Self::Single { path, .. } | Self::Archive { path, .. } => path,
        }
    }

    /// Name for the `Content-Disposition` header.
    pub fn file_name(&self) -> &str {
        match self {
            Self::Single { file_name, .. } | Self::Archive { file_name, .. } => file_name,
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, Self::Archive { .. })
    }
}

/// A delivery plus the guard that deletes every file of the request once
/// the delivery has been sent.
#[derive(Debug)]
pub struct PreparedDelivery {
    pub delivery: Delivery,
    pub guard: CleanupGuard,
}
