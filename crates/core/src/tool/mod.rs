//! Tool invocation for the three external converters.
//!
//! Every conversion is delegated to one of three command-line tools:
//!
//! - a raster image tool (ImageMagick by default)
//! - an office-document converter (LibreOffice by default)
//! - a media transcoder (FFmpeg by default)
//!
//! Commands are described as structured [`CommandSpec`] values and executed
//! by a [`ProcessRunner`] under a per-tool timeout. Success here only means
//! the process exited zero; whether the expected files exist is decided
//! later by the output collector.
//!
//! # Example
//!
//! ```ignore
//! use formatshift_core::tool::{CommandSpec, SystemProcessRunner, ToolInvoker, ToolsConfig};
//!
//! let invoker = ToolInvoker::new(ToolsConfig::default(), Arc::new(SystemProcessRunner::default()));
//! invoker.run(&CommandSpec::transcode(input, output, "error")).await?;
//! ```

mod config;
mod error;
mod invoker;
mod spec;
mod system;
mod traits;

pub use config::ToolsConfig;
pub use error::ToolError;
pub use invoker::{ToolInvoker, ToolStatus};
pub use spec::{CommandSpec, ToolKind};
pub use system::SystemProcessRunner;
pub use traits::ProcessRunner;
