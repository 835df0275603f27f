//! Application layer errors.
//!
//! These errors represent failures in orchestration, not addressing rules.
//! Addressing errors are `DomainError` from `crate::domain`.

use thiserror::Error;

use crate::domain::PlcId;
use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A repository call failed.
    #[error("Repository {operation} failed: {reason}")]
    Repository {
        operation: &'static str,
        reason: String,
    },

    /// The definition source named by a connection descriptor does not exist.
    #[error("Definition source not found: {location}")]
    SourceNotFound { location: String },

    /// The definition source exists but could not be parsed.
    #[error("Malformed definition source {location}: {reason}")]
    MalformedSource { location: String, reason: String },

    /// No offset table exists for the requested PLC.
    #[error("No offset table configured for PLC {plc_id}")]
    UnknownPlc { plc_id: PlcId },

    /// Store access failed (lock poisoned, etc.).
    #[error("Repository store error")]
    StoreLockError,

    /// A worker thread died while synthesizing.
    #[error("Synthesis worker panicked while processing PLC {plc_id}")]
    WorkerPanicked { plc_id: PlcId },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Repository { operation, reason } => vec![
                format!("Repository {} failed: {}", operation, reason),
                "Check that the project path or output directory is accessible".into(),
            ],
            Self::SourceNotFound { location } => vec![
                format!("Nothing found at {}", location),
                "Pass a project .toml file or a directory containing them".into(),
            ],
            Self::MalformedSource { location, .. } => vec![
                format!("Fix the syntax of {}", location),
                "Steps go in [[steps]] tables, timers in [[timers]] tables".into(),
            ],
            Self::UnknownPlc { plc_id } => vec![
                format!("Add a [plcs.{}] table to your configuration", plc_id),
                "Try: devmap offsets to see configured PLCs".into(),
            ],
            Self::StoreLockError => vec![
                "The repository store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::WorkerPanicked { .. } => vec!["Re-run with -vv and report the log".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Repository { .. } | Self::StoreLockError | Self::WorkerPanicked { .. } => {
                ErrorCategory::Internal
            }
            Self::SourceNotFound { .. } | Self::UnknownPlc { .. } => ErrorCategory::NotFound,
            Self::MalformedSource { .. } => ErrorCategory::Validation,
        }
    }
}
