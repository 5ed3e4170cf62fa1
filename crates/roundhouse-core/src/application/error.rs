//! Application layer errors.
//!
//! These errors represent failures in orchestration and storage, not
//! collection rules. Rule violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A record looked up by id does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Store access failed (lock poisoned, etc.).
    #[error("Collection store error")]
    StoreLockError,

    /// Reading or writing the persisted collection failed.
    #[error("Persistence error at {path}: {reason}")]
    PersistenceFailed { path: PathBuf, reason: String },

    /// Validation failed (application-level, not domain).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ApplicationError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { entity, .. } => vec![
                format!("No {} with that id is in the collection", entity),
                "List ids with: roundhouse purchase list / train list / decoder list".into(),
            ],
            Self::StoreLockError => vec![
                "The collection store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::PersistenceFailed { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have read and write permissions".into(),
                "Point --store at a different file to start a fresh collection".into(),
            ],
            Self::ValidationFailed(_) => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::StoreLockError | Self::PersistenceFailed { .. } => ErrorCategory::Internal,
            Self::ValidationFailed(_) => ErrorCategory::Validation,
        }
    }
}
