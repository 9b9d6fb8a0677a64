//! Format classification.
//!
//! Maps a file extension to the coarse format family that decides which
//! external tool, and which conversion strategy, applies to it.

mod table;
mod types;

pub use table::{classify, normalize_extension, FormatTable};
pub use types::Category;
