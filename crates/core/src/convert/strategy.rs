//! Strategy selection.

use serde::Serialize;
use std::fmt;

use crate::format::Category;

/// The sequence of tool invocations used for one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStrategy {
    /// Source and target share a category; one tool call.
    SameCategoryDirect(Category),
    /// Image to PDF, emitted directly by the rasterizer.
    ImageToDocumentDirectPdf,
    /// Image to a non-PDF document through an intermediate PDF.
    ImageToDocumentViaPdf,
    /// Document to image, rasterizing a PDF (made first if needed).
    DocumentToImageViaPdf,
    /// No strategy connects the two categories.
    Unsupported,
}

impl ConversionStrategy {
    /// Picks the strategy for a category pair. Pure and stateless.
    pub fn select(source: Category, target: Category, target_ext: &str) -> Self {
        use Category::*;
        match (source, target) {
            (Unknown, _) | (_, Unknown) => Self::Unsupported,
            (s, t) if s == t => Self::SameCategoryDirect(s),
            (Image, Document) if target_ext.eq_ignore_ascii_case("pdf") => {
                Self::ImageToDocumentDirectPdf
            }
            (Image, Document) => Self::ImageToDocumentViaPdf,
            (Document, Image) => Self::DocumentToImageViaPdf,
            _ => Self::Unsupported,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SameCategoryDirect(Category::Image) => "image_direct",
            Self::SameCategoryDirect(Category::Document) => "document_direct",
            Self::SameCategoryDirect(Category::Audio) => "audio_direct",
            Self::SameCategoryDirect(Category::Video) => "video_direct",
            Self::SameCategoryDirect(Category::Unknown) => "unknown_direct",
            Self::ImageToDocumentDirectPdf => "image_to_pdf",
            Self::ImageToDocumentViaPdf => "image_to_document_via_pdf",
            Self::DocumentToImageViaPdf => "document_to_image_via_pdf",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for ConversionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
