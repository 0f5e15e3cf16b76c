//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{DomainError, Violation};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("validation failed at {0}")]
    Validation(#[from] Violation),

    #[error("not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("no units found under {0}")]
    NoUnits(std::path::PathBuf),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {context}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
