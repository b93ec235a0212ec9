use std::path::PathBuf;

use thiserror::Error;

/// Error type for a migration run.
///
/// Every variant except `Io`, `Config` and `Database` is an expected outcome that callers
/// can match on through [`MigratorError::kind`].
#[derive(Error, Debug)]
pub enum MigratorError {
    #[error("Missing configuration: {0}")]
    ConfigurationMissing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Migration scripts directory does not exist: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("No migration script found in the specified directory: {}", path.display())]
    NoScriptsFound { path: PathBuf },

    #[error("Migration script is empty: {}", path.display())]
    EmptyScript { path: PathBuf },

    #[error("Failed to apply migration '{script}': {source}")]
    ExecutionFailed {
        script: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Migration cancelled: {reason}")]
    Cancelled { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Discriminant of [`MigratorError`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigurationMissing,
    Config,
    DirectoryNotFound,
    NoScriptsFound,
    EmptyScript,
    ExecutionFailed,
    Cancelled,
    Database,
    Io,
}

impl MigratorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationMissing(_) => ErrorKind::ConfigurationMissing,
            Self::Config(_) => ErrorKind::Config,
            Self::DirectoryNotFound { .. } => ErrorKind::DirectoryNotFound,
            Self::NoScriptsFound { .. } => ErrorKind::NoScriptsFound,
            Self::EmptyScript { .. } => ErrorKind::EmptyScript,
            Self::ExecutionFailed { .. } => ErrorKind::ExecutionFailed,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::Database(_) => ErrorKind::Database,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Name of the script involved, if the failure happened after selection.
    pub fn script_name(&self) -> Option<&str> {
        match self {
            Self::ExecutionFailed { script, .. } => Some(script),
            _ => None,
        }
    }

    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled {
            reason: reason.into(),
        }
    }
}

/// Result type alias using MigratorError.
pub type Result<T> = std::result::Result<T, MigratorError>;
