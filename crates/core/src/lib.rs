//! Conversion-routing engine.
//!
//! Classifies uploaded files by extension, routes each one through the
//! external tool chain its format pair needs, discovers what the tools
//! actually wrote, and deletes every file a request created once it is
//! done.

pub mod batch;
pub mod cleanup;
pub mod config;
pub mod convert;
pub mod format;
pub mod metrics;
pub mod testing;
pub mod tool;

pub use batch::{
    BatchError, BatchOrchestrator, BatchResult, ConversionRequest, Delivery, LimitsConfig,
    PreparedDelivery, UploadedFile, ARCHIVE_NAME,
};
pub use cleanup::{CleanupGuard, CleanupManager, CleanupReport, TempArtifact};
pub use config::{
    config_path_from_env, load_config, load_config_from_str, load_config_or_default,
    validate_config, Config, ConfigError, ServerConfig, WorkspaceConfig,
};
pub use convert::{ConversionError, ConversionRouter, ConversionStrategy, OutputCollector, OutputSet};
pub use format::{classify, normalize_extension, Category, FormatTable};
pub use tool::{
    CommandSpec, ProcessRunner, SystemProcessRunner, ToolError, ToolInvoker, ToolKind, ToolStatus,
    ToolsConfig,
};
