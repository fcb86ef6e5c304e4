//! Domain errors for the evaluation service.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The rubric source is missing or malformed.
///
/// Always recovered at startup by substituting a built-in rubric.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Rubric source not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read rubric source {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rubric source {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid rubric: {0}")]
    Invalid(String),
}

/// Failure reported by an analysis engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Analysis engine unavailable: {0}")]
    Unavailable(String),

    #[error("Analysis failed: {0}")]
    Failed(String),

    #[error("Analysis engine returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),
}

/// Caller-visible failure of a single evaluation.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The uploaded artifact could not be materialized on disk.
    #[error("Failed to store uploaded artifact: {0}")]
    Intake(#[source] std::io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Deleting a transient artifact failed. Logged, never surfaced.
#[derive(Debug, Error)]
#[error("Failed to delete transient artifact {}: {source}", path.display())]
pub struct CleanupWarning {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl EvaluationError {
    /// Short machine-readable code for logs and error payloads.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Intake(_) => "INTAKE_ERROR",
            Self::Engine(_) => "ENGINE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_detail_is_preserved() {
        let err = EvaluationError::from(EngineError::Failed("unreadable slide 3".to_string()));
        assert_eq!(err.to_string(), "Analysis failed: unreadable slide 3");
        assert_eq!(err.code(), "ENGINE_ERROR");
    }

    #[test]
    fn test_intake_error_message() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only fs");
        let err = EvaluationError::Intake(io);
        assert!(err.to_string().contains("read-only fs"));
        assert_eq!(err.code(), "INTAKE_ERROR");
    }

    #[test]
    fn test_configuration_error_mentions_path() {
        let err = ConfigurationError::NotFound(PathBuf::from("/etc/rubric.yaml"));
        assert!(err.to_string().contains("/etc/rubric.yaml"));
    }
}
