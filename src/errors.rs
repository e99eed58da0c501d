use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("executable not found at {}: {source}", .path.display())]
    ToolNotFound {
        path: PathBuf,
        #[source]
        source: which::Error,
    },

    #[error("failed to spawn command {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("error running command {command}: {status}")]
    Command { command: String, status: String },

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// The destructive step of a table restore that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreStep {
    /// Only reached when the existence check was interrupted.
    ExistenceCheck,
    Truncate,
    Restore,
}

impl fmt::Display for RestoreStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreStep::ExistenceCheck => f.write_str("existence check"),
            RestoreStep::Truncate => f.write_str("truncate"),
            RestoreStep::Restore => f.write_str("restore"),
        }
    }
}

/// A fatal failure that stopped a workspace restore run.
#[derive(Error, Debug)]
#[error("{step} failed for table {table}: {source}")]
pub struct RestoreFailure {
    pub table: String,
    pub step: RestoreStep,
    #[source]
    pub source: AppError,
}

impl RestoreFailure {
    pub fn new(table: &str, step: RestoreStep, source: AppError) -> Self {
        Self {
            table: table.to_string(),
            step,
            source,
        }
    }
}
