//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),

    /// The data was read but fails a consistency check.
    #[error("{0}")]
    Inconsistent(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Inconsistent(_) => crate::exitcode::DATAERR,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(_)
                    | ApplicationError::Validation(_)
                    | ApplicationError::Json { .. } => crate::exitcode::DATAERR,
                    ApplicationError::Io { .. } => crate::exitcode::IOERR,
                    ApplicationError::NotFound(_) | ApplicationError::NoUnits(_) => {
                        crate::exitcode::NOINPUT
                    }
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::SOFTWARE,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn given_domain_error_when_mapping_exit_code_then_is_dataerr() {
        let err: CliError = ApplicationError::from(DomainError::format("root[0]", "bad")).into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_unwritable_output_when_mapping_exit_code_then_is_ioerr() {
        let err: CliError = ApplicationError::Io {
            context: "write output: out.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::IOERR);
    }

    #[test]
    fn given_undecodable_input_when_mapping_exit_code_then_is_dataerr() {
        let source = serde_json::from_str::<serde_json::Value>("{broken").unwrap_err();
        let err: CliError = ApplicationError::Json {
            context: "decode outline: x.json".to_string(),
            source,
        }
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_missing_input_when_mapping_exit_code_then_is_noinput() {
        let err: CliError = ApplicationError::NotFound("x.json".into()).into();
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }
}
