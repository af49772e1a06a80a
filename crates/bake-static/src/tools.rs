//! External tool invocation.
//!
//! Stylesheet compilation and template bundling are delegated to Node tools run
//! through `sh -c`. Every run is bounded by a timeout and a missing binary is
//! reported separately from a failing one.

use std::io;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// Default upper bound on a single tool run.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(120);

/// Exit status `sh` reports when a command cannot be found.
const COMMAND_NOT_FOUND: i32 = 127;

/// Errors from running an external tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("It looks like \"{tool}\" isn't installed. {hint}")]
    Missing { tool: String, hint: String },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("{tool} did not finish within {}s", .timeout.as_secs())]
    TimedOut { tool: String, timeout: Duration },

    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },
}

impl ToolError {
    pub fn is_missing(&self) -> bool {
        matches!(self, ToolError::Missing { .. })
    }
}

/// An external command-line compiler.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    /// Short name used in logs, e.g. "lessc"
    pub label: String,

    /// Program invoked, possibly a relative path into node_modules
    pub program: String,

    /// Advice logged when the program is missing
    pub install_hint: String,

    /// Whether a failure aborts the build
    pub fatal: bool,

    /// Upper bound on a single run
    pub timeout: Duration,
}

impl ExternalTool {
    /// A fatal tool with the default timeout.
    pub fn new(label: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            install_hint: "Try running: \"npm install\"".to_string(),
            fatal: true,
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Log failures instead of aborting the build.
    pub fn tolerant(mut self) -> Self {
        self.fatal = false;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shell command line for the given arguments.
    pub fn command_line(&self, args: &[&str]) -> String {
        let mut line = self.program.clone();
        for arg in args {
            line.push(' ');
            line.push_str(&shell_quote(arg));
        }
        line
    }

    /// Run the tool. `on_error` sees the failure before it is returned.
    pub async fn run<F>(&self, args: &[&str], on_error: F) -> Result<(), ToolError>
    where
        F: FnOnce(&ToolError),
    {
        let command = self.command_line(args);

        match run_shell(&self.label, &command, self.timeout).await {
            Ok(()) => Ok(()),
            Err(ToolError::Missing { tool, .. }) => {
                let e = ToolError::Missing {
                    tool,
                    hint: self.install_hint.clone(),
                };
                on_error(&e);
                Err(e)
            }
            Err(e) => {
                on_error(&e);
                Err(e)
            }
        }
    }
}

/// Run a shell command, waiting at most `timeout` for it to exit.
pub async fn run_shell(label: &str, command: &str, timeout: Duration) -> Result<(), ToolError> {
    tracing::debug!("{}", command);

    let child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(label, e))?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|e| spawn_error(label, e))?,
        Err(_) => {
            return Err(ToolError::TimedOut {
                tool: label.to_string(),
                timeout,
            })
        }
    };

    if output.status.success() {
        return Ok(());
    }

    if output.status.code() == Some(COMMAND_NOT_FOUND) {
        return Err(ToolError::Missing {
            tool: label.to_string(),
            hint: String::new(),
        });
    }

    Err(ToolError::Failed {
        tool: label.to_string(),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// A program that cannot be found is reported as missing.
fn spawn_error(label: &str, e: io::Error) -> ToolError {
    if e.kind() == io::ErrorKind::NotFound {
        return ToolError::Missing {
            tool: label.to_string(),
            hint: String::new(),
        };
    }

    ToolError::Spawn {
        tool: label.to_string(),
        source: e,
    }
}

/// Quote a value for `sh`.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
