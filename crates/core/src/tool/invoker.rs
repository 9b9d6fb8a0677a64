//! Tool invoker: resolves binaries and timeouts, runs specs, records metrics.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::config::ToolsConfig;
use super::error::ToolError;
use super::spec::{CommandSpec, ToolKind};
use super::traits::ProcessRunner;
use crate::metrics::TOOL_INVOCATIONS;

/// Timeout for version probes.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Availability of one external tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub tool: ToolKind,
    pub program: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs [`CommandSpec`]s against the configured tools.
#[derive(Clone)]
pub struct ToolInvoker {
    config: ToolsConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl ToolInvoker {
    pub fn new(config: ToolsConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }

    /// Name of the process runner in use (`system` or a test double).
    pub fn runner_name(&self) -> &str {
        self.runner.name()
    }

    /// Runs a command under its tool's timeout.
    pub async fn run(&self, spec: &CommandSpec) -> Result<(), ToolError> {
        let program = self.config.program(spec.tool);
        let limit = self.config.timeout(spec.tool);
        debug!(
            tool = %spec.tool,
            program = %program.display(),
            runner = self.runner.name(),
            args = ?spec.args,
            timeout_secs = limit.as_secs(),
            "Running tool"
        );

        let result = self.runner.run(program, spec, limit).await;
        let label = match &result {
            Ok(()) => "success",
            Err(e) if e.timed_out() => "timeout",
            Err(_) => "failure",
        };
        TOOL_INVOCATIONS
            .with_label_values(&[spec.tool.as_str(), label])
            .inc();

        if let Err(ref e) = result {
            warn!(
                tool = %spec.tool,
                error = %e,
                stderr = e.stderr_excerpt().unwrap_or(""),
                "Tool invocation failed"
            );
        }
        result
    }

    /// Probes every tool with its version flag.
    pub async fn check_availability(&self) -> Vec<ToolStatus> {
        let mut statuses = Vec::with_capacity(ToolKind::ALL.len());
        for tool in ToolKind::ALL {
            let program = self.config.program(tool);
            let spec = CommandSpec::version(tool);
            let result = self.runner.run(program, &spec, PROBE_TIMEOUT).await;
            statuses.push(ToolStatus {
                tool,
                program: program.display().to_string(),
                available: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
            });
        }
        statuses
    }
}
