//! External command execution.
//!
//! Every checker and every git query goes through [`CommandRunner`], so the
//! whole orchestration can be driven by [`crate::fakes::ScriptedRunner`] in
//! tests. The real implementation blocks the caller until the child exits.
//! There is no timeout.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{PreflightError, Result};

/// Where a child's stdout/stderr go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Child writes straight to our terminal. Used for checkers.
    Inherit,
    /// Output is collected into [`CommandOutput`]. Used for queries.
    Capture,
}

/// A single command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub output: OutputMode,
}

impl Invocation {
    /// Build an invocation from a command vector (program first).
    ///
    /// Returns `None` for an empty vector.
    pub fn from_command(command: &[String], cwd: &Path) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            cwd: cwd.to_path_buf(),
            output: OutputMode::Inherit,
        })
    }

    /// Build a captured query invocation.
    pub fn query<I, S>(program: &str, args: I, cwd: &Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.to_path_buf(),
            output: OutputMode::Capture,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Shell-ish rendering for logs.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `-1` when killed by a signal.
    pub exit_code: i32,

    /// Captured stdout (empty in [`OutputMode::Inherit`]).
    pub stdout: String,

    /// Captured stderr (empty in [`OutputMode::Inherit`]).
    pub stderr: String,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Backend that runs commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `invocation` to completion.
    ///
    /// A non-zero exit is a successful `Ok` with that exit code; `Err` means
    /// the program could not be started at all.
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let start = Instant::now();
        debug!(command = %invocation.display(), cwd = %invocation.cwd.display(), "Spawning");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).current_dir(&invocation.cwd);

        let spawn_error = |source: std::io::Error| PreflightError::ToolInvocation {
            program: invocation.program.clone(),
            source,
        };

        let (exit_code, stdout, stderr) = match invocation.output {
            OutputMode::Inherit => {
                let status = command
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .await
                    .map_err(spawn_error)?;
                (status.code().unwrap_or(-1), String::new(), String::new())
            }
            OutputMode::Capture => {
                let output = command
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()
                    .await
                    .map_err(spawn_error)?;
                (
                    output.status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&output.stdout).to_string(),
                    String::from_utf8_lossy(&output.stderr).to_string(),
                )
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(command = %invocation.program, exit_code, duration_ms, "Finished");

        Ok(CommandOutput {
            exit_code,
            stdout,
            stderr,
            duration_ms,
        })
    }
}
