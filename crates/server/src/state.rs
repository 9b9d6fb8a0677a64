use std::path::Path;
use std::sync::Arc;

use formatshift_core::{
    BatchOrchestrator, Config, ConversionRouter, FormatTable, ProcessRunner, ToolInvoker,
};

/// Shared application state
pub struct AppState {
    config: Config,
    invoker: ToolInvoker,
    orchestrator: BatchOrchestrator,
}

impl AppState {
    /// Wires the conversion engine over `runner`.
    pub fn new(config: Config, runner: Arc<dyn ProcessRunner>) -> Self {
        let invoker = ToolInvoker::new(config.tools.clone(), runner);
        let router = ConversionRouter::new(invoker.clone());
        let orchestrator = BatchOrchestrator::new(
            router,
            config.workspace.dir.clone(),
            config.limits.clone(),
        );
        Self {
            config,
            invoker,
            orchestrator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn invoker(&self) -> &ToolInvoker {
        &self.invoker
    }

    pub fn orchestrator(&self) -> &BatchOrchestrator {
        &self.orchestrator
    }

    pub fn formats(&self) -> &FormatTable {
        self.orchestrator.router().table()
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.config.workspace.dir
    }

    /// Largest request body accepted: every file at full size, plus room
    /// for multipart framing and text fields.
    pub fn body_limit(&self) -> usize {
        const SLACK: u64 = 1024 * 1024;
        let limits = &self.config.limits;
        let total = limits
            .max_file_size_bytes
            .saturating_mul(limits.max_files as u64)
            .saturating_add(SLACK);
        usize::try_from(total).unwrap_or(usize::MAX)
    }
}
