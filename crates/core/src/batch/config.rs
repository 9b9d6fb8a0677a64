//! Request limits.

use serde::{Deserialize, Serialize};

/// Bounds on what one request may upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of files per request.
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Maximum size of a single uploaded file in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
}

fn default_max_files() -> usize {
    4
}

fn default_max_file_size() -> u64 {
    1024 * 1024 * 1024
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_file_size_bytes: default_max_file_size(),
        }
    }
}
