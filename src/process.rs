use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::errors::{Result, SmokeError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured result of one toolkit invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// stdout followed by stderr, as one string
    pub fn merged(&self) -> String {
        let mut merged = String::from_utf8_lossy(&self.stdout).into_owned();
        merged.push_str(&String::from_utf8_lossy(&self.stderr));
        merged
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Runs a toolkit binary with a deadline. The child is killed if the
/// deadline passes.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    program: PathBuf,
    timeout: Duration,
}

impl ToolRunner {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    pub async fn run(&self, args: &[String], stdin: Option<&[u8]>) -> Result<CommandOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(program = %self.program.display(), ?args, "Spawning toolkit binary");

        let mut child = cmd.spawn().map_err(|e| {
            SmokeError::ProcessError(format!(
                "Failed to spawn {}: {}",
                self.program.display(),
                e
            ))
        })?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            let input = input.to_vec();
            tokio::spawn(async move {
                // The child may exit without draining stdin
                if let Err(e) = pipe.write_all(&input).await {
                    tracing::debug!(error = %e, "Writing stdin failed");
                }
            });
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                tracing::warn!(
                    program = %self.program.display(),
                    timeout = %humantime::format_duration(self.timeout),
                    "Toolkit binary timed out"
                );
                SmokeError::ProcessError(format!(
                    "{} did not finish within {}",
                    self.program.display(),
                    humantime::format_duration(self.timeout)
                ))
            })??;

        Ok(CommandOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Render `source` with `-T<format>`
    pub async fn render(&self, format: &str, source: &str) -> Result<CommandOutput> {
        self.run(&[format!("-T{}", format)], Some(source.as_bytes()))
            .await
    }

    /// Output of `-V`, stdout and stderr merged
    pub async fn version_report(&self) -> Result<CommandOutput> {
        self.run(&["-V".to_string()], None).await
    }
}
