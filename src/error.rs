use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for release-flow operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Invalid release version: {0}")]
    InvalidVersion(String),

    #[error("Changelog entry '{heading}' not found in {}", .path.display())]
    MissingChangelogEntry { path: PathBuf, heading: String },

    #[error("Working tree has uncommitted changes:\n{status}")]
    DirtyWorkingTree { status: String },

    #[error("Command `{command}` failed with exit code {code}")]
    CommandFailure { command: String, code: i32 },

    #[error("Cannot update {}: expected line '{expected}' not found", .path.display())]
    ConfigWrite { path: PathBuf, expected: String },

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("{cause} (deleting local tag '{tag}' also failed: {rollback})")]
    RollbackFailed {
        tag: String,
        cause: Box<ReleaseError>,
        rollback: Box<ReleaseError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in release-flow
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create an invalid version error with context
    pub fn invalid_version(msg: impl Into<String>) -> Self {
        ReleaseError::InvalidVersion(msg.into())
    }

    /// Create a command failure from a rendered command line and exit code
    pub fn command_failure(command: impl Into<String>, code: i32) -> Self {
        ReleaseError::CommandFailure {
            command: command.into(),
            code,
        }
    }
}
