//! Testing utilities.
//!
//! [`FakeToolRunner`] stands in for the three external tools, reproducing
//! the files each one leaves behind so routing, collection and cleanup can
//! be exercised without ImageMagick, LibreOffice or FFmpeg installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use formatshift_core::testing::FakeToolRunner;
//!
//! let runner = Arc::new(FakeToolRunner::new());
//! runner.set_page_count(3).await;
//! runner.fail_tool(ToolKind::OfficeConverter).await;
//!
//! let invoker = ToolInvoker::new(ToolsConfig::default(), runner.clone());
//! ```

mod fake_runner;

pub use fake_runner::{FakeToolRunner, RecordedInvocation};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::batch::UploadedFile;

    /// Writes a small file into `dir` and returns its path.
    pub fn write_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("fixture {name}")).expect("Failed to write fixture");
        path
    }

    /// Writes an upload into `dir` under its own name.
    pub fn upload(dir: &Path, original_name: &str) -> UploadedFile {
        UploadedFile::new(original_name, write_file(dir, original_name))
    }

    /// Names of the files currently in `dir`, sorted.
    pub fn dir_listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}
