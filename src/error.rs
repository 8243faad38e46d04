use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for prepare-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Malformed version: '{0}' - expected X.Y.Z or X.Y.Z-SNAPSHOT")]
    MalformedVersion(String),

    #[error("Not a snapshot: '{0}' - release mode requires a -SNAPSHOT version")]
    NotASnapshot(String),

    #[error("Version overflow: cannot increment the patch number of '{0}'")]
    VersionOverflow(String),

    #[error("Changelog format error: {0}")]
    ChangelogFormat(String),

    #[error("No occurrences of '{literal}' found in {}", path.display())]
    NoOccurrencesFound { path: PathBuf, literal: String },

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Build descriptor error: {0}")]
    Descriptor(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in prepare-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a malformed version error for the raw input
    pub fn malformed(raw: impl Into<String>) -> Self {
        ReleaseError::MalformedVersion(raw.into())
    }

    /// Create a changelog format error with context
    pub fn changelog(msg: impl Into<String>) -> Self {
        ReleaseError::ChangelogFormat(msg.into())
    }

    /// Create a usage error with context
    pub fn usage(msg: impl Into<String>) -> Self {
        ReleaseError::Usage(msg.into())
    }

    /// Create a build descriptor error with context
    pub fn descriptor(msg: impl Into<String>) -> Self {
        ReleaseError::Descriptor(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Attach the offending path to an I/O error
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReleaseError::File {
            path: path.into(),
            source,
        }
    }
}
