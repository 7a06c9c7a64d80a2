//! External tool invocation
//!
//! The dump and restore tools run as child processes. Secrets reach the
//! child only through that child's own environment; the parent process
//! environment is never touched.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::crypto::SecureString;
use crate::error::{VaultError, VaultResult};

/// Environment variable through which the dump tool reads the password
pub const PASSWORD_ENV: &str = "PGPASSWORD";

/// A single external process invocation
pub struct ToolInvocation {
    /// Executable to run
    pub program: PathBuf,
    /// Command-line arguments (never secrets)
    pub args: Vec<String>,
    /// Extra environment for this child only
    pub secret_env: Vec<(&'static str, SecureString)>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secret_env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn secret_env(mut self, key: &'static str, value: SecureString) -> Self {
        self.secret_env.push((key, value));
        self
    }

    /// Command line without environment, safe to log
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

impl fmt::Debug for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolInvocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field(
                "secret_env",
                &self.secret_env.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Result of a finished tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
    /// Captured standard error
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external tools to completion
pub trait ToolRunner {
    /// Run a tool and wait for it
    ///
    /// There is no timeout; a hung tool blocks the run.
    fn run(&self, invocation: &ToolInvocation) -> VaultResult<ToolOutput>;
}

/// Runner spawning real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> VaultResult<ToolOutput> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        for (key, value) in &invocation.secret_env {
            command.env(key, value.as_str());
        }

        let output = command.output().map_err(|e| {
            VaultError::Tool(format!("Failed to start {}: {}", invocation.program.display(), e))
        })?;

        // Command keeps its own copy of the environment; drop it now
        drop(command);

        Ok(ToolOutput {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Locate an executable
///
/// An explicit path wins when it exists; otherwise `name` is looked up on
/// the search path.
pub fn resolve_tool(explicit: Option<&Path>, name: &str) -> VaultResult<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(
            "Configured path {} for {} does not exist, searching PATH",
            path.display(),
            name
        );
    }

    which::which(name).map_err(|e| VaultError::Tool(format!("Could not find {}: {}", name, e)))
}
