//! Output discovery.
//!
//! Tools do not agree on where they write: the rasterizer writes the exact
//! path for single-page input but `<base>-N.<ext>` for multi-page input,
//! and may do either for the same command. The collector inspects the
//! target directory after the fact and returns what is really there.

use regex_lite::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::error::ConversionError;

/// The verified output files of one conversion, in delivery order.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSet {
    paths: Vec<PathBuf>,
}

impl OutputSet {
    fn new(paths: Vec<PathBuf>) -> Self {
        debug_assert!(!paths.is_empty());
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Re-checks that every file still exists.
    pub async fn verify(&self) -> Result<(), ConversionError> {
        for path in &self.paths {
            if !fs::try_exists(path).await.unwrap_or(false) {
                return Err(ConversionError::NoOutputProduced {
                    target: path.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Finds the files a conversion actually produced.
pub struct OutputCollector;

impl OutputCollector {
    /// Looks for `<base_name>-<digits>.<target_ext>` in `target_dir` first,
    /// sorted by page number, then for `target_path` itself.
    pub async fn collect(
        target_path: &Path,
        target_dir: &Path,
        base_name: &str,
        target_ext: &str,
    ) -> Result<OutputSet, ConversionError> {
        let pages = Self::indexed_outputs(target_dir, base_name, target_ext).await?;
        if !pages.is_empty() {
            debug!(
                target = %target_path.display(),
                pages = pages.len(),
                "Collected page-indexed outputs"
            );
            return Ok(OutputSet::new(pages));
        }

        let exists = fs::try_exists(target_path)
            .await
            .map_err(|e| ConversionError::io("checking output", e))?;
        if exists {
            return Ok(OutputSet::new(vec![target_path.to_path_buf()]));
        }

        Err(ConversionError::NoOutputProduced {
            target: target_path.to_path_buf(),
        })
    }

    /// [`collect`](Self::collect) with directory, base name and extension
    /// taken from `target_path`.
    pub async fn collect_for(target_path: &Path) -> Result<OutputSet, ConversionError> {
        let dir = target_path.parent().unwrap_or_else(|| Path::new("."));
        let base = target_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let ext = target_path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        Self::collect(target_path, dir, base, ext).await
    }

    /// Page files, ascending by numeric index.
    async fn indexed_outputs(
        dir: &Path,
        base_name: &str,
        ext: &str,
    ) -> Result<Vec<PathBuf>, ConversionError> {
        let pattern = format!(
            r"^{}-(\d+)\.{}$",
            regex_lite::escape(base_name),
            regex_lite::escape(ext)
        );
        let re = Regex::new(&pattern)
            .map_err(|e| ConversionError::conversion_failed(format!("bad output pattern: {e}")))?;

        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| ConversionError::io("listing output directory", e))?;

        let mut indexed: Vec<(u64, PathBuf)> = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ConversionError::io("listing output directory", e))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(index) = re
                .captures(name)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<u64>().ok())
            else {
                continue;
            };
            indexed.push((index, entry.path()));
        }

        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, path)| path).collect())
    }
}
