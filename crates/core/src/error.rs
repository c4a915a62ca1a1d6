//! Error types for the seedbed provisioner.
//!
//! The three provisioning failures (`Fetch`, `Write`, `ServiceStart`) are
//! terminal for a run. Each maps to its own process exit code so callers can
//! tell them apart without parsing messages.

use thiserror::Error;

/// Unified error type for seedbed.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote seed could not be fetched (unreachable, non-success status,
    /// redirect loop, timeout, digest mismatch)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Seed file could not be persisted locally
    #[error("Write error: {0}")]
    Write(String),

    /// Orchestration command failed or could not be invoked
    #[error("Service start error: {0}")]
    ServiceStart(String),

    /// Compose template rendering errors
    #[error("Template error: {0}")]
    Template(String),

    /// I/O and filesystem errors outside the seed write path
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Fetch(_) => 3,
            AppError::Write(_) => 4,
            AppError::ServiceStart(_) => 5,
            _ => 1,
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Fetch(_) => "fetch",
            AppError::Write(_) => "write",
            AppError::ServiceStart(_) => "service_start",
            AppError::Template(_) => "template",
            AppError::Io(_) => "io",
            AppError::Serialization(_) => "serialization",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisioning_errors_have_distinct_exit_codes() {
        let fetch = AppError::Fetch("404".to_string()).exit_code();
        let write = AppError::Write("disk full".to_string()).exit_code();
        let start = AppError::ServiceStart("daemon down".to_string()).exit_code();

        assert_ne!(fetch, write);
        assert_ne!(fetch, start);
        assert_ne!(write, start);
        assert!(fetch != 0 && write != 0 && start != 0);
    }

    #[test]
    fn test_generic_errors_exit_one() {
        assert_eq!(AppError::Config("bad".to_string()).exit_code(), 1);
        assert_eq!(AppError::Template("x".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_display_includes_kind_prefix() {
        let err = AppError::ServiceStart("exit status 1".to_string());
        assert_eq!(err.to_string(), "Service start error: exit status 1");
        assert_eq!(err.kind(), "service_start");
    }
}
