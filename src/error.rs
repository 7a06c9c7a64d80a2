//! Custom error types for pgvault
//!
//! This module defines the error hierarchy for the backup runner using
//! thiserror for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for pgvault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// A directory could not be created or written to
    #[error("Path unavailable: {}: {reason}", .path.display())]
    Path { path: PathBuf, reason: String },

    /// One of the tier directories failed the path guard
    #[error("Backup paths unavailable: {0}")]
    PathsUnavailable(String),

    /// The credential store has no record for the target
    #[error("No credentials found for target '{0}'")]
    NoCredentials(String),

    /// The external dump tool exited unsuccessfully
    #[error("Dump failed with {}: {stderr}", describe_exit(.exit_code))]
    DumpFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The dump tool succeeded but its artifact could not be listed
    #[error("Integrity check failed for {}", .artifact.display())]
    IntegrityCheckFailed { artifact: PathBuf },

    /// An external tool could not be located or started
    #[error("Tool error: {0}")]
    Tool(String),

    /// The retention sweep could not complete
    #[error("Cleanup error: {0}")]
    Cleanup(String),

    /// The failure alert could not be sent
    #[error("Notification error: {0}")]
    Notification(String),

    /// Encryption errors
    #[error("Encryption error: {0}")]
    Encryption(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl VaultError {
    /// Create a path error from an underlying cause
    pub fn path(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Path {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Short failure class used in notification subjects
    pub fn failure_class(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigError",
            Self::Io(_) | Self::Json(_) => "IoError",
            Self::Path { .. } | Self::PathsUnavailable(_) => "PathsUnavailable",
            Self::NoCredentials(_) => "NoCredentials",
            Self::DumpFailed { .. } => "DumpFailed",
            Self::IntegrityCheckFailed { .. } => "IntegrityCheckFailed",
            Self::Tool(_) => "ToolUnavailable",
            Self::Cleanup(_) => "CleanupFailed",
            Self::Notification(_) => "NotificationFailed",
            Self::Encryption(_) => "CredentialStoreError",
        }
    }

    /// Check if this error should abort the run
    ///
    /// Cleanup and notification failures are reported but never change
    /// the process exit status.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Cleanup(_) | Self::Notification(_))
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for pgvault operations
pub type VaultResult<T> = Result<T, VaultError>;
