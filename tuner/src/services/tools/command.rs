//! Subprocess runner shared by every tool collaborator

use crate::error::{TunerError, TunerResult};
use std::ffi::OsString;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured output of a successful run
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Pass whatever the tool printed on a successful run to the debug log
    pub fn log(&self, tool: &str) {
        if !self.stdout.is_empty() {
            tracing::debug!(tool, stdout = %self.stdout, "Tool output");
        }
        if !self.stderr.is_empty() {
            tracing::debug!(tool, stderr = %self.stderr, "Tool diagnostics");
        }
    }
}

/// One invocation of an external program
///
/// Arguments are passed as an argv, never through a shell. The child is
/// killed if the run is dropped or times out.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: OsString,
    args: Vec<OsString>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program name used in errors and logs
    pub fn tool_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Command line as a single display string
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| {
                let part = part.to_string_lossy();
                if part.contains(' ') {
                    format!("\"{}\"", part)
                } else {
                    part.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion
    ///
    /// # Errors
    /// - [`TunerError::Collaborator`] when the program cannot be spawned or
    ///   exits unsuccessfully (diagnostic is stderr, else stdout)
    /// - [`TunerError::Timeout`] when the configured timeout elapses
    pub async fn run(&self) -> TunerResult<ToolOutput> {
        tracing::debug!(command = %self.display(), "Running tool");

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TunerError::Collaborator {
                tool: self.tool_name(),
                status: "failed to start".to_string(),
                diagnostic: e.to_string(),
            })?;

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| TunerError::Timeout {
                    tool: self.tool_name(),
                    seconds: limit.as_secs(),
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| TunerError::Collaborator {
            tool: self.tool_name(),
            status: "wait failed".to_string(),
            diagnostic: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            let diagnostic = if stderr.is_empty() { stdout } else { stderr };
            tracing::warn!(
                command = %self.display(),
                status = %output.status,
                "Tool reported failure"
            );
            return Err(TunerError::Collaborator {
                tool: self.tool_name(),
                status: output.status.to_string(),
                diagnostic,
            });
        }

        Ok(ToolOutput { stdout, stderr })
    }
}
