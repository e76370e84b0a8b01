//! Base command execution abstraction
//!
//! Provides the foundational trait for executing external commands scoped to a
//! working directory, enabling dependency injection for testing.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Upper bound on a single external command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Output reported for a command that exceeded its timeout.
pub const TIMED_OUT_OUTPUT: &str = "Command timed out";

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == 0
    }
}

#[derive(Debug, Error, Clone)]
pub enum CommandError {
    #[error("Command not found: {command}")]
    CommandNotFound { command: String },
    #[error("Command timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("IO error: {message}")]
    Io { message: String },
}

/// Pass/fail view of a command run, as consumed by the orchestrator.
///
/// `output` holds trimmed stdout on success and trimmed stderr on failure
/// (stdout when stderr is blank, since git prints merge conflicts there).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub succeeded: bool,
    pub output: String,
}

impl CommandOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            output: output.into(),
        }
    }

    pub fn from_result(result: Result<CommandOutput, CommandError>) -> Self {
        match result {
            Ok(output) if output.success() => Self::success(output.stdout.trim_end()),
            Ok(output) => {
                let stderr = output.stderr.trim_end();
                if stderr.trim().is_empty() {
                    Self::failure(output.stdout.trim_end())
                } else {
                    Self::failure(stderr)
                }
            }
            Err(CommandError::Timeout { .. }) => Self::failure(TIMED_OUT_OUTPUT),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

/// Trait for executing external commands
///
/// This abstraction allows the rest of the codebase to execute commands
/// without directly depending on process spawning, enabling testing
/// with recording fakes.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(
        &self,
        working_dir: &Path,
        program: &str,
        args: &[&str],
    ) -> Result<CommandOutput, CommandError>;

    /// Run a command and fold every error into a failed outcome. Never errors.
    async fn run(&self, working_dir: &Path, program: &str, args: &[&str]) -> CommandOutcome {
        CommandOutcome::from_result(self.execute(working_dir, program, args).await)
    }
}

/// Real implementation using `tokio::process::Command`
///
/// A command that times out is not killed: it is left to finish on its own so
/// the working tree is never abandoned halfway through a git operation.
pub struct ProcessCommandExecutor {
    timeout: Duration,
}

impl Default for ProcessCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessCommandExecutor {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CommandExecutor for ProcessCommandExecutor {
    async fn execute(
        &self,
        working_dir: &Path,
        program: &str,
        args: &[&str],
    ) -> Result<CommandOutput, CommandError> {
        debug!(
            program,
            args = ?args,
            cwd = %working_dir.display(),
            "Spawning command"
        );

        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .current_dir(working_dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(false);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CommandError::CommandNotFound {
                        command: program.to_string(),
                    }
                } else {
                    CommandError::Io {
                        message: e.to_string(),
                    }
                }
            })?,
            Err(_) => {
                return Err(CommandError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        };

        Ok(CommandOutput {
            status_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_process_command_executor_success() {
        let executor = ProcessCommandExecutor::new();
        let dir = TempDir::new().unwrap();
        let result = executor.execute(dir.path(), "echo", &["hello"]).await;

        assert!(result.is_ok());
        let output = result.unwrap();
        assert!(output.success());
        assert!(output.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_process_command_executor_command_not_found() {
        let executor = ProcessCommandExecutor::new();
        let dir = TempDir::new().unwrap();
        let result = executor
            .execute(dir.path(), "nonexistent_command_xyz", &[])
            .await;

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            CommandError::CommandNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_run_reports_missing_executable_as_failure() {
        let executor = ProcessCommandExecutor::new();
        let dir = TempDir::new().unwrap();
        let outcome = executor.run(dir.path(), "nonexistent_command_xyz", &[]).await;

        assert!(!outcome.succeeded);
        assert!(outcome.output.contains("nonexistent_command_xyz"));
    }

    #[tokio::test]
    async fn test_run_uses_working_directory() {
        let executor = ProcessCommandExecutor::new();
        let dir = TempDir::new().unwrap();
        let outcome = executor.run(dir.path(), "pwd", &[]).await;

        assert!(outcome.succeeded);
        let reported = std::fs::canonicalize(&outcome.output).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[tokio::test]
    async fn test_run_captures_stderr_on_non_zero_exit() {
        let executor = ProcessCommandExecutor::new();
        let dir = TempDir::new().unwrap();
        let outcome = executor
            .run(dir.path(), "sh", &["-c", "echo ignored; echo broken >&2; exit 3"])
            .await;

        assert!(!outcome.succeeded);
        assert_eq!(outcome.output, "broken");
    }

    #[tokio::test]
    async fn test_run_trims_trailing_whitespace() {
        let executor = ProcessCommandExecutor::new();
        let dir = TempDir::new().unwrap();
        let outcome = executor
            .run(dir.path(), "sh", &["-c", "printf 'done  \\n\\n'"])
            .await;

        assert!(outcome.succeeded);
        assert_eq!(outcome.output, "done");
    }

    #[tokio::test]
    async fn test_timeout_is_reported_as_failure() {
        let executor = ProcessCommandExecutor::new().with_timeout(Duration::from_millis(100));
        let dir = TempDir::new().unwrap();
        let outcome = executor.run(dir.path(), "sleep", &["2"]).await;

        assert!(!outcome.succeeded);
        assert_eq!(outcome.output, TIMED_OUT_OUTPUT);
    }

    #[test]
    fn test_outcome_falls_back_to_stdout_when_stderr_blank() {
        let outcome = CommandOutcome::from_result(Ok(CommandOutput {
            status_code: 1,
            stdout: "CONFLICT (content): Merge conflict in a.txt\n".to_string(),
            stderr: "  \n".to_string(),
        }));

        assert!(!outcome.succeeded);
        assert_eq!(outcome.output, "CONFLICT (content): Merge conflict in a.txt");
    }
}
