//! Unified error handling for RoundHouse Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for RoundHouse Core operations.
#[derive(Debug, Error, Clone)]
pub enum RoundhouseError {
    /// Errors from the domain layer (collection rule violations).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration and storage failures).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl RoundhouseError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Run 'roundhouse config list' to see the effective settings".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in RoundHouse".into()],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Consistency => ErrorCategory::Consistency,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Application(ApplicationError::StoreLockError))
    }

    /// Whether this is a missing-record error at any layer.
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Consistency,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type RoundhouseResult<T> = Result<T, RoundhouseError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> RoundhouseResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> RoundhouseResult<T> {
        self.map_err(|e| RoundhouseError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_flow_through_layers() {
        let err: RoundhouseError = DomainError::PositionOutOfRange {
            position: 9,
            len: 2,
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Validation);

        let err: RoundhouseError = ApplicationError::not_found("train", "abc").into();
        assert!(err.is_not_found());
        assert!(!err.is_retryable());

        let err: RoundhouseError = ApplicationError::StoreLockError.into();
        assert!(err.is_retryable());
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn context_wraps_foreign_errors_as_internal() {
        let parsed: Result<i64, _> = "sixty-four".parse::<i64>();
        let err = parsed.context("reading baseline").unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Internal);
        assert!(err.to_string().contains("reading baseline"));
    }
}
