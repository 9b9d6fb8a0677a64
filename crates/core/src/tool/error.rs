//! Error types for tool invocation.

use std::path::PathBuf;
use thiserror::Error;

use super::spec::ToolKind;

/// Errors surfaced by running an external tool.
///
/// A non-zero exit or a timeout is always an error. Stdout is never
/// consulted; stderr is only kept as a diagnostic excerpt.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool binary could not be found.
    #[error("{tool} not found at path: {}", .program.display())]
    NotFound { tool: ToolKind, program: PathBuf },

    /// The tool exited with a non-zero status.
    #[error("{tool} exited with {}", describe_exit(.exit_code))]
    Failed {
        tool: ToolKind,
        exit_code: Option<i32>,
        stderr_excerpt: Option<String>,
    },

    /// The tool did not finish in time and was killed.
    #[error("{tool} timed out after {timeout_secs} seconds")]
    TimedOut { tool: ToolKind, timeout_secs: u64 },

    /// Spawning or waiting on the process failed.
    #[error("I/O error running {tool}: {source}")]
    Io {
        tool: ToolKind,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    /// Creates a failed-exit error.
    pub fn failed(tool: ToolKind, exit_code: Option<i32>, stderr_excerpt: Option<String>) -> Self {
        Self::Failed {
            tool,
            exit_code,
            stderr_excerpt,
        }
    }

    pub fn tool(&self) -> ToolKind {
        match self {
            Self::NotFound { tool, .. }
            | Self::Failed { tool, .. }
            | Self::TimedOut { tool, .. }
            | Self::Io { tool, .. } => *tool,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Failed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    pub fn stderr_excerpt(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr_excerpt, .. } => stderr_excerpt.as_deref(),
            _ => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (killed by signal)".to_string(),
    }
}
