//! Unified error type hierarchy for Bench Studio
//!
//! Provides structured error handling with AggregatorError, RunnerError,
//! ConfigError, RecordError and the UI-facing AppError.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Run record persistence errors.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Run record not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid JSON in run record {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize run record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error during record operations: {0}")]
    IoError(#[from] io::Error),
}

/// Result aggregation errors.
#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("Results path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Benchmark execution errors.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("A benchmark run is already in progress")]
    AlreadyRunning,

    #[error("No benchmark cases registered")]
    NoCases,

    #[error("Benchmark command '{cmd}' failed: {reason}")]
    CommandFailed { cmd: String, reason: String },

    #[error("Timing histogram error: {0}")]
    Measurement(String),

    #[error("Benchmark task panicked: {0}")]
    TaskPanicked(String),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("IO error during benchmark run: {0}")]
    IoError(#[from] io::Error),
}

/// Settings file parsing and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid JSON in config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

/// Error surfaced to the window's status area.
///
/// Collaborator errors are converted into this type at the UI boundary so the
/// window can show a single message without knowing which layer failed.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// Scanning the results directory failed
    #[error("Scan failed: {0}")]
    Scan(String),

    /// A benchmark run failed or could not start
    #[error("Run failed: {0}")]
    Run(String),

    /// Settings persist or deserialize error
    #[error("Settings error: {0}")]
    Settings(String),

    /// File I/O error (read/write/delete)
    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    /// Get a user-facing error message suitable for UI display
    pub fn user_message(&self) -> String {
        match self {
            AppError::Scan(msg) => format!("Could not load benchmark results: {}", msg),
            AppError::Run(msg) => format!("Benchmark run failed: {}", msg),
            AppError::Settings(msg) => format!("Settings error: {}", msg),
            AppError::Io(msg) => format!("File operation failed: {}", msg),
        }
    }
}

impl From<AggregatorError> for AppError {
    fn from(e: AggregatorError) -> Self {
        AppError::Scan(e.to_string())
    }
}

impl From<RunnerError> for AppError {
    fn from(e: RunnerError) -> Self {
        AppError::Run(e.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Settings(e.to_string())
    }
}

impl From<io::Error> for AppError {
    fn from(e: io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

/// Top-level result type for operations that may fail.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_error_display() {
        let err = RunnerError::AlreadyRunning;
        assert_eq!(err.to_string(), "A benchmark run is already in progress");
    }

    #[test]
    fn test_command_failed_display() {
        let err = RunnerError::CommandFailed {
            cmd: "cargo bench".to_string(),
            reason: "exit status 101".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Benchmark command 'cargo bench' failed: exit status 101"
        );
    }

    #[test]
    fn test_app_error_from_aggregator() {
        let err: AppError = AggregatorError::NotADirectory(PathBuf::from("/tmp/x.json")).into();
        assert!(matches!(err, AppError::Scan(_)));
        assert!(err.user_message().starts_with("Could not load benchmark results"));
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<i32> = Err("test error".into());
        assert!(result.is_err());
    }
}
