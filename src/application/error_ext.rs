//! Error conversion helpers for load/save boundaries
//!
//! Provides extension traits for cleaner error handling with path context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting I/O and decode results to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an error.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&path)
    ///     .with_path_context("read outline", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

fn context(action: &str, path: &Path) -> String {
    format!("{}: {}", action, path.display())
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Io {
            context: context(action, path),
            source,
        })
    }
}

impl<T> IoResultExt<T> for serde_json::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Json {
            context: context(action, path),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_io_failure_when_adding_context_then_is_io_variant_naming_path() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));

        let err = result
            .with_path_context("write output", Path::new("out.json"))
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Io { .. }));
        assert_eq!(err.to_string(), "I/O error: write output: out.json");
    }
}
