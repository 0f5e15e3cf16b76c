//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent malformed outline data.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed node at {path}: {reason}")]
    Format { path: String, reason: String },

    #[error("invalid span '{raw}': {reason}")]
    InvalidSpan { raw: String, reason: String },
}

impl DomainError {
    pub fn format(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_span(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSpan {
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
