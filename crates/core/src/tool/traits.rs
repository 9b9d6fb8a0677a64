//! Trait definitions for the tool module.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use super::error::ToolError;
use super::spec::CommandSpec;

/// Executes a tool command and reports only its exit outcome.
///
/// Implementations must kill the process if `timeout` elapses and report
/// `ToolError::TimedOut`. Tests substitute a runner that fakes the tools'
/// filesystem side effects.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs `program` with the spec's arguments.
    async fn run(
        &self,
        program: &Path,
        spec: &CommandSpec,
        timeout: Duration,
    ) -> Result<(), ToolError>;
}
