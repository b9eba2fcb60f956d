//! External command execution.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Bytes of stderr kept in a failure report.
const STDERR_TAIL: usize = 2048;

/// A command line with extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name, resolved on `PATH`, or a path.
    pub program: String,
    /// Arguments.
    pub args: Vec<String>,
    /// Variables set on top of the inherited environment.
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Command with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Append an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set an environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Errors from running an external command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The program is not on `PATH`.
    #[error("{program}: executable not found: {message}")]
    NotFound {
        /// Program that was looked up.
        program: String,
        /// Lookup failure.
        message: String,
    },

    /// The process could not be spawned or waited on.
    #[error("failed to run {command}: {source}")]
    Launch {
        /// Rendered command line.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The process exited unsuccessfully.
    #[error("{command} exited with {status}{}", stderr_suffix(.stderr))]
    Failed {
        /// Rendered command line.
        command: String,
        /// Exit status description.
        status: String,
        /// Tail of the captured stderr.
        stderr: String,
    },

    /// The process did not finish in time and was killed.
    #[error("{command} timed out after {}s", .timeout.as_secs())]
    TimedOut {
        /// Rendered command line.
        command: String,
        /// Configured limit.
        timeout: Duration,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{stderr}")
    }
}

/// Launches commands and waits for them.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] if the command cannot start, fails, or
    /// times out.
    async fn run(&self, command: &CommandSpec) -> Result<(), CommandError>;
}

/// Runs commands as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Runner that waits for commands indefinitely.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill commands that run longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn resolve(program: &str) -> Result<PathBuf, CommandError> {
        which::which(program).map_err(|e| CommandError::NotFound {
            program: program.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<(), CommandError> {
        let rendered = spec.to_string();
        let binary = Self::resolve(&spec.program)?;

        let mut cmd = Command::new(binary);
        cmd.args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the output future on timeout must take the child with it.
            .kill_on_drop(true);

        debug!(command = %rendered, "Running command");
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| CommandError::TimedOut {
                    command: rendered.clone(),
                    timeout: limit,
                })?,
            None => cmd.output().await,
        }
        .map_err(|source| CommandError::Launch {
            command: rendered.clone(),
            source,
        })?;

        if !output.stdout.is_empty() {
            debug!(
                command = %rendered,
                stdout = %String::from_utf8_lossy(&output.stdout).trim_end(),
                "Command output"
            );
        }
        if !output.status.success() {
            return Err(CommandError::Failed {
                command: rendered,
                status: output.status.to_string(),
                stderr: tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL),
            });
        }
        Ok(())
    }
}

/// Last `max` bytes of `text`, trimmed, cut on a char boundary.
fn tail(text: &str, max: usize) -> String {
    let text = text.trim();
    let mut start = text.len().saturating_sub(max);
    while !text.is_char_boundary(start) {
        start = start.saturating_add(1);
    }
    text[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_command_line() {
        let spec = CommandSpec::new("go")
            .arg("get")
            .arg("-v")
            .arg("github.com/mholt/caddy")
            .env("GOPATH", "/go");
        assert_eq!(spec.to_string(), "go get -v github.com/mholt/caddy");
        assert_eq!(spec.env, vec![("GOPATH".to_string(), "/go".to_string())]);
    }

    #[test]
    fn tail_keeps_end_on_char_boundary() {
        assert_eq!(tail("  short \n", 100), "short");
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("aé", 1), "");
    }

    #[test]
    fn failed_display_includes_stderr() {
        let err = CommandError::Failed {
            command: "git clone x y".to_string(),
            status: "exit status: 128".to_string(),
            stderr: "fatal: repository not found".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("exit status: 128"));
        assert!(rendered.contains("fatal: repository not found"));
    }

    #[tokio::test]
    async fn missing_program_is_not_found() {
        let runner = ProcessRunner::new();
        let err = runner
            .run(&CommandSpec::new("plugscout-definitely-missing-binary"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::NotFound { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_failed() {
        let runner = ProcessRunner::new();
        let err = runner.run(&CommandSpec::new("false")).await.unwrap_err();
        assert!(matches!(err, CommandError::Failed { .. }), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_command() {
        let runner = ProcessRunner::new().with_timeout(Some(Duration::from_secs(30)));
        runner.run(&CommandSpec::new("true")).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_times_out() {
        let runner = ProcessRunner::new().with_timeout(Some(Duration::from_millis(50)));
        let err = runner
            .run(&CommandSpec::new("sleep").arg("5"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::TimedOut { .. }));
    }
}
