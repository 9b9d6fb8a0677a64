//! Error types for the batch module.

use thiserror::Error;

use crate::convert::ConversionError;

/// Errors that fail a whole batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No files uploaded")]
    NoFiles,

    #[error("Too many files: {count} uploaded, at most {max} allowed")]
    TooManyFiles { count: usize, max: usize },

    #[error("Target format not specified")]
    MissingTargetFormat,

    /// The requested target extension is not in any format table.
    #[error("Unsupported target format: {extension}")]
    UnsupportedFormat { extension: String },

    /// One file of the batch could not be planned or converted.
    #[error("{file}: {source}")]
    Conversion {
        file: String,
        #[source]
        source: ConversionError,
    },

    #[error("Failed to build archive: {0}")]
    Archive(#[source] std::io::Error),
}

impl BatchError {
    /// Whether the request itself was invalid (HTTP 400) rather than
    /// failing during execution.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::NoFiles
            | Self::TooManyFiles { .. }
            | Self::MissingTargetFormat
            | Self::UnsupportedFormat { .. } => true,
            Self::Conversion { source, .. } => source.is_client_error(),
            Self::Archive(_) => false,
        }
    }

    /// Tool stderr behind the failure, if any.
    pub fn stderr_excerpt(&self) -> Option<&str> {
        match self {
            Self::Conversion { source, .. } => source.stderr_excerpt(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Category;
    use crate::tool::{ToolError, ToolKind};

    #[test]
    fn test_client_errors() {
        assert!(BatchError::NoFiles.is_client_error());
        assert!(BatchError::MissingTargetFormat.is_client_error());
        assert!(BatchError::TooManyFiles { count: 5, max: 4 }.is_client_error());

        let unsupported = BatchError::Conversion {
            file: "song.mp3".into(),
            source: ConversionError::UnsupportedConversion {
                from: Category::Audio,
                to: Category::Image,
                target_ext: "png".into(),
            },
        };
        assert!(unsupported.is_client_error());

        let failed = BatchError::Conversion {
            file: "a.png".into(),
            source: ToolError::failed(ToolKind::Rasterizer, Some(1), Some("bad".into())).into(),
        };
        assert!(!failed.is_client_error());
        assert_eq!(failed.stderr_excerpt(), Some("bad"));
    }

    #[test]
    fn test_display_names_file() {
        let err = BatchError::Conversion {
            file: "scan.png".into(),
            source: ConversionError::conversion_failed("no intermediate"),
        };
        assert_eq!(err.to_string(), "scan.png: Conversion failed: no intermediate");
    }
}
