//! Unified error handling for devmap core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for devmap core operations.
///
/// This enum wraps all possible errors that can occur when using devmap-core,
/// providing a unified interface for error handling.
#[derive(Debug, Error, Clone)]
pub enum DevmapError {
    /// Errors from the domain layer (addressing rules, record shape).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (repositories, adapters).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DevmapError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
        }
    }

    /// `true` if the error must stop the whole batch of the PLC it concerns.
    ///
    /// Per-record domain errors are the only ones a batch survives.
    pub fn is_fatal_for_batch(&self) -> bool {
        !matches!(self, Self::Domain(e) if e.is_per_record())
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type DevmapResult<T> = Result<T, DevmapError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DeviceSpace;

    #[test]
    fn missing_offset_is_fatal_configuration() {
        let err: DevmapError = DomainError::MissingOffsetConfiguration {
            plc_id: 1,
            space: DeviceSpace::ProcessTimer,
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.is_fatal_for_batch());
    }

    #[test]
    fn bad_record_is_not_fatal() {
        let err: DevmapError = DomainError::UnknownTimerCategory { timer_id: 2, code: 0 }.into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(!err.is_fatal_for_batch());
    }

    #[test]
    fn repository_failure_is_fatal() {
        let err: DevmapError = ApplicationError::Repository {
            operation: "fetch",
            reason: "disk on fire".into(),
        }
        .into();
        assert!(err.is_fatal_for_batch());
        assert_eq!(err.category(), ErrorCategory::Internal);
    }
}
