//! Error types for the convert module.

use std::path::PathBuf;
use thiserror::Error;

use crate::format::Category;
use crate::tool::ToolError;

/// Errors that can occur while converting one file.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The extension is not in any format table.
    #[error("Unsupported format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Both formats are known but no strategy connects them.
    #[error("Unsupported conversion from {from} to {to} ({target_ext})")]
    UnsupportedConversion {
        from: Category,
        to: Category,
        target_ext: String,
    },

    /// An external tool failed or timed out.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// A step completed but left the filesystem in an unexpected state.
    #[error("Conversion failed: {reason}")]
    ConversionFailed { reason: String },

    /// The tool exited successfully but no output file exists.
    #[error("No output produced for {}", target.display())]
    NoOutputProduced { target: PathBuf },

    /// Renaming, copying or listing files failed.
    #[error("I/O error during {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConversionError {
    pub fn conversion_failed(reason: impl Into<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether the caller asked for something that can never work, as
    /// opposed to an attempt that failed while running.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::UnsupportedConversion { .. }
        )
    }

    /// Tool stderr, when the failure came from a tool.
    pub fn stderr_excerpt(&self) -> Option<&str> {
        match self {
            Self::Tool(e) => e.stderr_excerpt(),
            _ => None,
        }
    }
}
