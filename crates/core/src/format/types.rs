//! Types for the format module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse format family of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Image,
    Document,
    Audio,
    Video,
    /// The extension is not in any table.
    Unknown,
}

impl Category {
    /// All categories that name a real format family.
    pub const KNOWN: [Category; 4] = [
        Category::Image,
        Category::Document,
        Category::Audio,
        Category::Video,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Audio and video share the media transcoder.
    pub fn is_media(&self) -> bool {
        matches!(self, Self::Audio | Self::Video)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
