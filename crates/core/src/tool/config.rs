//! Configuration for the external tools.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::spec::ToolKind;

/// Binary locations, timeouts and fixed policies for the external tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the raster image tool.
    #[serde(default = "default_rasterizer_path")]
    pub rasterizer_path: PathBuf,

    /// Path to the office-document converter.
    #[serde(default = "default_office_path")]
    pub office_path: PathBuf,

    /// Path to the media transcoder.
    #[serde(default = "default_transcoder_path")]
    pub transcoder_path: PathBuf,

    /// Timeout for a rasterizer invocation in seconds.
    #[serde(default = "default_rasterize_timeout")]
    pub rasterize_timeout_secs: u64,

    /// Timeout for an office converter invocation in seconds.
    #[serde(default = "default_office_timeout")]
    pub office_timeout_secs: u64,

    /// Timeout for a transcoder invocation in seconds.
    #[serde(default = "default_transcode_timeout")]
    pub transcode_timeout_secs: u64,

    /// Resolution used when rasterizing PDF pages.
    #[serde(default = "default_density")]
    pub rasterize_density: u32,

    /// Transcoder log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub transcoder_log_level: String,

    /// How many trailing characters of stderr to keep on failure.
    #[serde(default = "default_excerpt_chars")]
    pub stderr_excerpt_chars: usize,
}

fn default_rasterizer_path() -> PathBuf {
    PathBuf::from("magick")
}

fn default_office_path() -> PathBuf {
    PathBuf::from("soffice")
}

fn default_transcoder_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_rasterize_timeout() -> u64 {
    120
}

fn default_office_timeout() -> u64 {
    180
}

fn default_transcode_timeout() -> u64 {
    600
}

fn default_density() -> u32 {
    300
}

fn default_log_level() -> String {
    "error".to_string()
}

fn default_excerpt_chars() -> usize {
    2000
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            rasterizer_path: default_rasterizer_path(),
            office_path: default_office_path(),
            transcoder_path: default_transcoder_path(),
            rasterize_timeout_secs: default_rasterize_timeout(),
            office_timeout_secs: default_office_timeout(),
            transcode_timeout_secs: default_transcode_timeout(),
            rasterize_density: default_density(),
            transcoder_log_level: default_log_level(),
            stderr_excerpt_chars: default_excerpt_chars(),
        }
    }
}

impl ToolsConfig {
    /// Binary to execute for a tool.
    pub fn program(&self, tool: ToolKind) -> &PathBuf {
        match tool {
            ToolKind::Rasterizer => &self.rasterizer_path,
            ToolKind::OfficeConverter => &self.office_path,
            ToolKind::MediaTranscoder => &self.transcoder_path,
        }
    }

    /// Upper bound on a single invocation of a tool.
    pub fn timeout(&self, tool: ToolKind) -> Duration {
        let secs = match tool {
            ToolKind::Rasterizer => self.rasterize_timeout_secs,
            ToolKind::OfficeConverter => self.office_timeout_secs,
            ToolKind::MediaTranscoder => self.transcode_timeout_secs,
        };
        Duration::from_secs(secs)
    }

    /// Sets the same timeout for every tool.
    pub fn with_timeouts(mut self, timeout_secs: u64) -> Self {
        self.rasterize_timeout_secs = timeout_secs;
        self.office_timeout_secs = timeout_secs;
        self.transcode_timeout_secs = timeout_secs;
        self
    }
}
