//! Fake process runner for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::tool::{CommandSpec, ProcessRunner, ToolError, ToolKind};

/// A recorded tool invocation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedInvocation {
    pub program: PathBuf,
    pub spec: CommandSpec,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
enum Failure {
    Tool(ToolKind),
    InputContains(String),
    Timeout(ToolKind),
}

/// Fake implementation of the [`ProcessRunner`] trait.
///
/// Reproduces each tool's filesystem contract:
/// - rasterizer: writes the output path, or `<stem>-1..N.<ext>` when
///   rasterizing a PDF with a page count above one
/// - office converter: writes `<outdir>/<input-stem>.<ext>`
/// - transcoder: writes the output path
///
/// Behavior is controllable for testing:
/// - record every invocation
/// - fail a tool, or any invocation whose input name contains a marker
/// - time a tool out
/// - exit zero without writing anything
/// - write the output, then exit non-zero
/// - report a tool as not installed
#[derive(Debug, Clone, Default)]
pub struct FakeToolRunner {
    invocations: Arc<RwLock<Vec<RecordedInvocation>>>,
    page_count: Arc<RwLock<Option<usize>>>,
    failures: Arc<RwLock<Vec<Failure>>>,
    silent: Arc<RwLock<HashSet<ToolKind>>>,
    fail_after_write: Arc<RwLock<HashSet<ToolKind>>>,
    unavailable: Arc<RwLock<HashSet<ToolKind>>>,
}

impl FakeToolRunner {
    /// Create a new fake runner where every tool succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded invocations, version probes included.
    pub async fn invocations(&self) -> Vec<RecordedInvocation> {
        self.invocations.read().await.clone()
    }

    /// Tools used for conversions, in call order.
    pub async fn tools_invoked(&self) -> Vec<ToolKind> {
        self.invocations
            .read()
            .await
            .iter()
            .filter(|i| !i.spec.is_version_probe())
            .map(|i| i.spec.tool)
            .collect()
    }

    /// Number of conversion invocations (version probes excluded).
    pub async fn conversion_count(&self) -> usize {
        self.tools_invoked().await.len()
    }

    /// Clear recorded invocations.
    pub async fn clear_recorded(&self) {
        self.invocations.write().await.clear();
    }

    /// Rasterizing a PDF yields this many page files.
    pub async fn set_page_count(&self, pages: usize) {
        *self.page_count.write().await = Some(pages);
    }

    /// Every invocation of `tool` exits with code 1.
    pub async fn fail_tool(&self, tool: ToolKind) {
        self.failures.write().await.push(Failure::Tool(tool));
    }

    /// Invocations whose input file name contains `marker` exit with code 1.
    pub async fn fail_input_containing(&self, marker: impl Into<String>) {
        self.failures
            .write()
            .await
            .push(Failure::InputContains(marker.into()));
    }

    /// Every invocation of `tool` times out.
    pub async fn time_out_tool(&self, tool: ToolKind) {
        self.failures.write().await.push(Failure::Timeout(tool));
    }

    /// `tool` exits zero but writes nothing.
    pub async fn set_silent(&self, tool: ToolKind) {
        self.silent.write().await.insert(tool);
    }

    /// `tool` writes its usual output, then exits with code 1.
    pub async fn fail_after_writing(&self, tool: ToolKind) {
        self.fail_after_write.write().await.insert(tool);
    }

    /// `tool` behaves as if it were not installed.
    pub async fn set_unavailable(&self, tool: ToolKind) {
        self.unavailable.write().await.insert(tool);
    }

    /// Clear every injected failure.
    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
        self.silent.write().await.clear();
        self.fail_after_write.write().await.clear();
        self.unavailable.write().await.clear();
    }

    fn input_of(spec: &CommandSpec) -> Option<PathBuf> {
        match spec.tool {
            ToolKind::Rasterizer => spec.trailing_paths(2).into_iter().next(),
            ToolKind::OfficeConverter => spec.trailing_paths(1).into_iter().next(),
            ToolKind::MediaTranscoder => spec.flag_value("-i").map(PathBuf::from),
        }
    }

    async fn check_failures(&self, spec: &CommandSpec, input: &Path) -> Result<(), ToolError> {
        let input_name = input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        for failure in self.failures.read().await.iter() {
            match failure {
                Failure::Tool(tool) if *tool == spec.tool => {
                    return Err(ToolError::failed(
                        spec.tool,
                        Some(1),
                        Some(format!("simulated {} failure", spec.tool)),
                    ));
                }
                Failure::InputContains(marker) if input_name.contains(marker.as_str()) => {
                    return Err(ToolError::failed(
                        spec.tool,
                        Some(1),
                        Some(format!("cannot read {input_name}")),
                    ));
                }
                Failure::Timeout(tool) if *tool == spec.tool => {
                    return Err(ToolError::TimedOut {
                        tool: spec.tool,
                        timeout_secs: 1,
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    async fn write_output(tool: ToolKind, input: &Path, output: &Path) -> Result<(), ToolError> {
        let body = format!(
            "{} output from {}",
            tool,
            input.file_name().unwrap_or_default().to_string_lossy()
        );
        tokio::fs::write(output, body)
            .await
            .map_err(|e| ToolError::Io { tool, source: e })
    }

    async fn simulate(&self, spec: &CommandSpec, input: &Path) -> Result<(), ToolError> {
        match spec.tool {
            ToolKind::Rasterizer => {
                let output = spec
                    .trailing_paths(1)
                    .into_iter()
                    .next()
                    .unwrap_or_default();
                let is_pdf = input
                    .extension()
                    .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
                let pages = self.page_count.read().await.unwrap_or(1);
                if is_pdf && pages > 1 {
                    let dir = output.parent().unwrap_or_else(|| Path::new("."));
                    let stem = output.file_stem().unwrap_or_default().to_string_lossy();
                    let ext = output.extension().unwrap_or_default().to_string_lossy();
                    for page in 1..=pages {
                        let page_path = dir.join(format!("{stem}-{page}.{ext}"));
                        Self::write_output(spec.tool, input, &page_path).await?;
                    }
                    Ok(())
                } else {
                    Self::write_output(spec.tool, input, &output).await
                }
            }
            ToolKind::OfficeConverter => {
                let ext = spec
                    .flag_value("--convert-to")
                    .map(|e| e.to_string_lossy().to_string())
                    .unwrap_or_default();
                let outdir = spec
                    .flag_value("--outdir")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."));
                let stem = input.file_stem().unwrap_or_default().to_string_lossy();
                let output = outdir.join(format!("{stem}.{ext}"));
                Self::write_output(spec.tool, input, &output).await
            }
            ToolKind::MediaTranscoder => {
                let output = spec
                    .trailing_paths(1)
                    .into_iter()
                    .next()
                    .unwrap_or_default();
                Self::write_output(spec.tool, input, &output).await
            }
        }
    }
}

#[async_trait]
impl ProcessRunner for FakeToolRunner {
    fn name(&self) -> &str {
        "fake"
    }

    async fn run(
        &self,
        program: &Path,
        spec: &CommandSpec,
        timeout: Duration,
    ) -> Result<(), ToolError> {
        self.invocations.write().await.push(RecordedInvocation {
            program: program.to_path_buf(),
            spec: spec.clone(),
            timeout,
        });

        if self.unavailable.read().await.contains(&spec.tool) {
            return Err(ToolError::NotFound {
                tool: spec.tool,
                program: program.to_path_buf(),
            });
        }

        if spec.is_version_probe() {
            return Ok(());
        }

        let input = Self::input_of(spec).unwrap_or_default();
        self.check_failures(spec, &input).await?;

        if !tokio::fs::try_exists(&input).await.unwrap_or(false) {
            return Err(ToolError::failed(
                spec.tool,
                Some(1),
                Some(format!("no such file: {}", input.display())),
            ));
        }

        if self.silent.read().await.contains(&spec.tool) {
            return Ok(());
        }

        self.simulate(spec, &input).await?;

        if self.fail_after_write.read().await.contains(&spec.tool) {
            return Err(ToolError::failed(
                spec.tool,
                Some(1),
                Some(format!("{} crashed after writing output", spec.tool)),
            ));
        }
        Ok(())
    }
}
