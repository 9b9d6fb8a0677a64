//! The static extension-to-category table.

use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

use super::types::Category;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "ico", "svg", "heic", "avif",
];

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "odt", "rtf", "txt", "html", "htm", "xls", "xlsx", "ods", "csv", "ppt",
    "pptx", "odp", "epub",
];

const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "m4a", "wma", "opus", "aiff",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "webm", "flv", "wmv", "m4v", "mpeg", "mpg", "3gp",
];

static DEFAULT_TABLE: Lazy<FormatTable> = Lazy::new(FormatTable::standard);

/// Immutable extension-to-category membership table.
///
/// Built once and shared by reference; there is no way to mutate it after
/// construction.
#[derive(Debug, Clone)]
pub struct FormatTable {
    entries: HashMap<&'static str, Category>,
}

impl FormatTable {
    /// The built-in table.
    pub fn standard() -> Self {
        Self::from_lists(&[
            (Category::Image, IMAGE_EXTENSIONS),
            (Category::Document, DOCUMENT_EXTENSIONS),
            (Category::Audio, AUDIO_EXTENSIONS),
            (Category::Video, VIDEO_EXTENSIONS),
        ])
    }

    /// Builds a table from per-category lists. The first category that
    /// claims an extension keeps it.
    pub fn from_lists(lists: &[(Category, &[&'static str])]) -> Self {
        let mut entries = HashMap::new();
        for (category, extensions) in lists {
            for ext in extensions.iter() {
                entries.entry(*ext).or_insert(*category);
            }
        }
        Self { entries }
    }

    /// The process-wide default table.
    pub fn global() -> &'static FormatTable {
        &DEFAULT_TABLE
    }

    /// Classifies an extension, case-insensitively. A leading dot is
    /// ignored. Unmatched extensions are `Category::Unknown`.
    pub fn classify(&self, extension: &str) -> Category {
        let ext = normalize_extension(extension);
        self.entries
            .get(ext.as_str())
            .copied()
            .unwrap_or(Category::Unknown)
    }

    /// Extensions of one category, sorted.
    pub fn extensions(&self, category: Category) -> Vec<&'static str> {
        let mut exts: Vec<&'static str> = self
            .entries
            .iter()
            .filter(|(_, c)| **c == category)
            .map(|(e, _)| *e)
            .collect();
        exts.sort_unstable();
        exts
    }

    /// All known extensions grouped by category name.
    pub fn by_category(&self) -> BTreeMap<&'static str, Vec<&'static str>> {
        Category::KNOWN
            .iter()
            .map(|c| (c.as_str(), self.extensions(*c)))
            .collect()
    }
}

/// Classifies an extension against the default table.
pub fn classify(extension: &str) -> Category {
    DEFAULT_TABLE.classify(extension)
}

/// Lower-cases an extension and strips a leading dot and whitespace.
pub fn normalize_extension(extension: &str) -> String {
    extension
        .trim()
        .trim_start_matches('.')
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_classify_each_table() {
        for ext in IMAGE_EXTENSIONS {
            assert_eq!(classify(ext), Category::Image, "{}", ext);
        }
        for ext in DOCUMENT_EXTENSIONS {
            assert_eq!(classify(ext), Category::Document, "{}", ext);
        }
        for ext in AUDIO_EXTENSIONS {
            assert_eq!(classify(ext), Category::Audio, "{}", ext);
        }
        for ext in VIDEO_EXTENSIONS {
            assert_eq!(classify(ext), Category::Video, "{}", ext);
        }
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        for ext in IMAGE_EXTENSIONS
            .iter()
            .chain(DOCUMENT_EXTENSIONS)
            .chain(AUDIO_EXTENSIONS)
            .chain(VIDEO_EXTENSIONS)
        {
            let upper = ext.to_uppercase();
            assert_eq!(classify(&upper), classify(ext), "{}", upper);
        }
        assert_eq!(classify("JpEg"), Category::Image);
        assert_eq!(classify(".PDF"), Category::Document);
    }

    #[test]
    fn test_unknown_extensions() {
        assert_eq!(classify("exe"), Category::Unknown);
        assert_eq!(classify(""), Category::Unknown);
        assert_eq!(classify("pn"), Category::Unknown);
        assert_eq!(classify("pngx"), Category::Unknown);
        assert_eq!(classify("tar.gz"), Category::Unknown);
    }

    #[test]
    fn test_tables_are_disjoint() {
        let mut seen = HashSet::new();
        for ext in IMAGE_EXTENSIONS
            .iter()
            .chain(DOCUMENT_EXTENSIONS)
            .chain(AUDIO_EXTENSIONS)
            .chain(VIDEO_EXTENSIONS)
        {
            assert!(seen.insert(*ext), "{} listed twice", ext);
        }
    }

    #[test]
    fn test_from_lists_first_claim_wins() {
        let table = FormatTable::from_lists(&[
            (Category::Video, &["webm"][..]),
            (Category::Audio, &["webm", "mp3"][..]),
        ]);
        assert_eq!(table.classify("webm"), Category::Video);
        assert_eq!(table.classify("mp3"), Category::Audio);
        assert_eq!(table.classify("png"), Category::Unknown);
    }

    #[test]
    fn test_by_category_sorted() {
        let grouped = FormatTable::global().by_category();
        assert_eq!(grouped.len(), 4);
        let images = &grouped["image"];
        let mut sorted = images.clone();
        sorted.sort_unstable();
        assert_eq!(images, &sorted);
        assert!(images.contains(&"png"));
        assert!(!grouped.contains_key("unknown"));
    }
}
