//! SafeCommandExecutor: allow-listed execution of container engine commands
//!
//! # Security Features
//!
//! - **Whitelist-based validation**: Only container engine binaries can execute
//! - **Injection prevention**: Uses `tokio::process::Command`, never a shell
//! - **Argument sanitization**: Arguments passed as a slice, never interpolated into shell strings
//! - **Working directory validation**: Validates existence before execution
//! - **Secret input**: Sensitive values go through stdin instead of the argument vector
//!
//! # Example
//!
//! ```rust,no_run
//! use image_publisher::SafeCommandExecutor;
//!
//! # async fn example() -> Result<(), image_publisher::CommandError> {
//! let executor = SafeCommandExecutor::new(std::env::temp_dir())?;
//! let status = executor.run("docker", &["version"], None).await?;
//! println!("docker exited with {:?}", status.code());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};

/// Allowed commands whitelist for security.
///
/// Only these commands can be executed via SafeCommandExecutor.
const ALLOWED_COMMANDS: &[&str] = &["docker", "podman"];

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    /// Command is not in the allowed whitelist
    #[error("Command '{0}' is not in the allowed whitelist")]
    CommandNotAllowed(String),

    /// Working directory does not exist or is not accessible
    #[error("Working directory does not exist: {0}")]
    InvalidWorkingDirectory(PathBuf),

    /// Command execution failed (e.g., binary not found, permission denied)
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),
}

/// Returns true if `command` may be executed by [`SafeCommandExecutor`]
pub fn is_allowed_command(command: &str) -> bool {
    ALLOWED_COMMANDS.contains(&command)
}

/// Safe command executor with security controls
///
/// Commands run with inherited stdout/stderr so build and push progress
/// reaches the terminal as it happens. There is no timeout: a hanging
/// engine blocks the run.
#[derive(Debug)]
pub struct SafeCommandExecutor {
    /// Working directory where commands will be executed
    working_dir: PathBuf,
}

impl SafeCommandExecutor {
    /// Create a new SafeCommandExecutor with working directory validation.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidWorkingDirectory` if the directory does not exist.
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Result<Self, CommandError> {
        let working_dir = working_dir.as_ref().to_path_buf();

        if !working_dir.is_dir() {
            return Err(CommandError::InvalidWorkingDirectory(working_dir));
        }

        Ok(Self { working_dir })
    }

    /// Run a command to completion and return its exit status.
    ///
    /// When `stdin` is given it is written to the child's standard input,
    /// which is then closed. Otherwise the child gets no stdin.
    ///
    /// # Errors
    ///
    /// - `CommandError::CommandNotAllowed` - Command not in whitelist
    /// - `CommandError::ExecutionFailed` - Binary not found or execution error
    pub async fn run(
        &self,
        command: &str,
        args: &[&str],
        stdin: Option<&[u8]>,
    ) -> Result<ExitStatus, CommandError> {
        if !is_allowed_command(command) {
            return Err(CommandError::CommandNotAllowed(command.to_string()));
        }

        tracing::debug!(
            command,
            args = ?args,
            cwd = %self.working_dir.display(),
            "spawning command"
        );

        let child = Command::new(command)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        let status = feed_and_wait(child, stdin).await?;

        tracing::debug!(command, code = ?status.code(), "command finished");

        Ok(status)
    }
}

/// Write `stdin` to the child, close the pipe and wait for the exit status.
///
/// A child that exits without reading its input closes the pipe early; the
/// write error is ignored and the child's own exit status is returned.
async fn feed_and_wait(
    mut child: Child,
    stdin: Option<&[u8]>,
) -> Result<ExitStatus, CommandError> {
    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        if let Err(e) = pipe.write_all(input).await {
            tracing::debug!(error = %e, "child closed stdin before reading all input");
        }
        drop(pipe);
    }

    child
        .wait()
        .await
        .map_err(|e| CommandError::ExecutionFailed(e.to_string()))
}
