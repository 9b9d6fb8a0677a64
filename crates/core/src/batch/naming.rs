//! Collision-free file names for the shared workspace.
//!
//! Every upload and every generated target is named
//! `<stem>-<utc timestamp ms>-<8 hex>.<ext>`, so files from concurrent
//! requests, or from uploads sharing a basename, never meet.

use chrono::Utc;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const MAX_STEM_CHARS: usize = 64;
const FALLBACK_STEM: &str = "file";

/// The stem of `original_name`, reduced to characters that are safe in a
/// file name on every platform.
pub fn sanitize_stem(original_name: &str) -> String {
    // Browsers may send a full client path.
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    let stem = Path::new(base)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_CHARS)
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '_' || c == '-');

    if cleaned.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        cleaned.to_string()
    }
}

/// The lower-cased extension of `original_name`, or an empty string.
pub fn extension_of(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    Path::new(base)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// `<sanitized stem>-<timestamp>-<token>[.<ext>]`.
pub fn unique_name(original_name: &str, ext: &str) -> String {
    let stem = sanitize_stem(original_name);
    let timestamp = Utc::now().format("%Y%m%d%H%M%S%3f");
    let token = Uuid::new_v4().simple().to_string();
    let token = &token[..8];
    if ext.is_empty() {
        format!("{stem}-{timestamp}-{token}")
    } else {
        format!("{stem}-{timestamp}-{token}.{ext}")
    }
}

/// Where an upload named `original_name` is stored in `dir`.
pub fn upload_path(dir: &Path, original_name: &str) -> PathBuf {
    dir.join(unique_name(original_name, &extension_of(original_name)))
}

/// Where the conversion of `original_name` to `target_ext` is written.
pub fn target_path(dir: &Path, original_name: &str, target_ext: &str) -> PathBuf {
    dir.join(unique_name(original_name, target_ext))
}
