//! Conversion routing.
//!
//! Given a source file and a requested target, the router picks a
//! [`ConversionStrategy`] from the two format categories, runs the tool
//! chain it implies, and asks the [`OutputCollector`] which files actually
//! came out. The filesystem, not the tools' exit codes, decides whether a
//! conversion produced anything.
//!
//! | Source   | Target   | Strategy                                         |
//! |----------|----------|--------------------------------------------------|
//! | image    | image    | rasterizer, one call                             |
//! | document | document | office converter, output renamed to target       |
//! | audio    | audio    | transcoder, one call                             |
//! | video    | video    | transcoder, one call                             |
//! | image    | pdf      | rasterizer writes the PDF directly               |
//! | image    | document | rasterizer to temp PDF, then office converter    |
//! | document | image    | office converter to temp PDF (unless PDF), then rasterize pages |
//! | other    | other    | unsupported, nothing is run                      |

mod collector;
mod error;
mod router;
mod strategy;

pub use collector::{OutputCollector, OutputSet};
pub use error::ConversionError;
pub use router::ConversionRouter;
pub use strategy::ConversionStrategy;
