// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (for retry logic)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("unknown {kind}: '{value}'")]
    UnknownValue { kind: &'static str, value: String },

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("position {position} is out of range for a list of {len} item(s)")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("sort index baseline must be between 2 and 2^32, got {baseline}")]
    InvalidBaseline { baseline: i64 },

    #[error("DCC address {address} is outside 1..=10239")]
    InvalidAddress { address: u16 },

    // ========================================================================
    // Consistency Errors (409-level equivalent)
    // ========================================================================
    #[error("sort indices are not strictly increasing in {context}")]
    UnorderedIndices { context: String },

    #[error("Duplicate id in {context}: {id}")]
    DuplicateId { context: String, id: String },

    #[error("{context} is inconsistent: {reason}")]
    Inconsistent { context: String, reason: String },

    // ========================================================================
    // Not Found Errors (404-level equivalent)
    // ========================================================================
    #[error("{entity} not found: {id}")]
    ChildNotFound { entity: &'static str, id: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownValue { kind, value } => vec![
                format!("'{}' is not a recognised {}", value, kind),
                "Values are matched against their display names, ignoring case".into(),
            ],
            Self::PositionOutOfRange { len, .. } => vec![
                format!("Choose a position between 1 and {}", len + 1),
                "Omit the position to append at the end".into(),
            ],
            Self::InvalidBaseline { .. } => vec![
                "Set ordering.baseline between 2 and 4294967296 (64 is the default)".into(),
            ],
            Self::InvalidAddress { .. } => vec![
                "Short addresses use 1-127, long addresses 128-10239".into(),
            ],
            Self::UnorderedIndices { .. } => vec![
                "The stored ordering is inconsistent; re-saving the record renumbers it".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownValue { .. }
            | Self::MissingRequiredField { .. }
            | Self::PositionOutOfRange { .. }
            | Self::InvalidBaseline { .. }
            | Self::InvalidAddress { .. } => ErrorCategory::Validation,
            Self::UnorderedIndices { .. } | Self::DuplicateId { .. } | Self::Inconsistent { .. } => {
                ErrorCategory::Consistency
            }
            Self::ChildNotFound { .. } => ErrorCategory::NotFound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Consistency,
    NotFound,
}
