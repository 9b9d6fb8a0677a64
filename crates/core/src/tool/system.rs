//! Process runner backed by real child processes.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::error::ToolError;
use super::spec::CommandSpec;
use super::traits::ProcessRunner;

/// Runs tools as child processes with stdin/stdout detached and stderr
/// captured for diagnostics.
#[derive(Debug, Clone)]
pub struct SystemProcessRunner {
    excerpt_chars: usize,
}

impl Default for SystemProcessRunner {
    fn default() -> Self {
        Self::new(2000)
    }
}

impl SystemProcessRunner {
    /// Creates a runner keeping at most `excerpt_chars` trailing characters
    /// of stderr on failure.
    pub fn new(excerpt_chars: usize) -> Self {
        Self { excerpt_chars }
    }

    /// Last `max_chars` characters of the tool's stderr, trimmed.
    fn excerpt(stderr: &[u8], max_chars: usize) -> Option<String> {
        let text = String::from_utf8_lossy(stderr);
        let text = text.trim();
        if text.is_empty() || max_chars == 0 {
            return None;
        }
        let count = text.chars().count();
        let excerpt: String = text.chars().skip(count.saturating_sub(max_chars)).collect();
        Some(excerpt)
    }
}

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    fn name(&self) -> &str {
        "system"
    }

    async fn run(
        &self,
        program: &Path,
        spec: &CommandSpec,
        limit: Duration,
    ) -> Result<(), ToolError> {
        let mut command = Command::new(program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own group, so helpers the tool forks (soffice.bin) die with it.
        #[cfg(unix)]
        command.process_group(0);

        let child = command
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ToolError::NotFound {
                        tool: spec.tool,
                        program: program.to_path_buf(),
                    }
                } else {
                    ToolError::Io {
                        tool: spec.tool,
                        source: e,
                    }
                }
            })?;

        let pid = child.id();

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match timeout(limit, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ToolError::Io {
                    tool: spec.tool,
                    source: e,
                })
            }
            Err(_) => {
                kill_process_group(pid);
                return Err(ToolError::TimedOut {
                    tool: spec.tool,
                    timeout_secs: limit.as_secs(),
                })
            }
        };

        if !output.status.success() {
            return Err(ToolError::failed(
                spec.tool,
                output.status.code(),
                Self::excerpt(&output.stderr, self.excerpt_chars),
            ));
        }

        Ok(())
    }
}

/// Kills every process left in the tool's group.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pid) = pid.and_then(|p| libc::pid_t::try_from(p).ok()) else {
        return;
    };
    // SAFETY: killpg only signals; a group that is already gone yields ESRCH.
    let rc = unsafe { libc::killpg(pid, libc::SIGKILL) };
    if rc != 0 {
        debug!(pgid = pid, error = %std::io::Error::last_os_error(), "Process group already gone");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
