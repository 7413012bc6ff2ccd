//! Error types for PartScout.
//!
//! Every variant renders as a single human-readable line; the session records
//! that string as the user-facing message when an operation fails. Nothing
//! here is fatal to the process - the session always stays recoverable via
//! reset or retry.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for PartScout operations.
#[derive(Debug, Error)]
pub enum ScoutError {
    // Catalog ingestion errors
    #[error("The file could not be read as a spreadsheet: {message}")]
    CorruptFile { message: String },

    #[error(
        "No valid parts were found in the file. Check that column A holds \
         codes and column B holds descriptions."
    )]
    EmptyCatalog,

    // Session guard errors
    #[error("No parts catalog is loaded. Import a spreadsheet first.")]
    NoCatalogLoaded,

    #[error("A catalog is already loaded. Reset the session before importing another file.")]
    CatalogAlreadyLoaded,

    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    // Remote matcher errors
    #[error("The matching service request failed: {message}")]
    RemoteCallFailed {
        message: String,
        /// HTTP status code, when the failure was a non-2xx response.
        status: Option<u16>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },
}

/// Result type alias for PartScout operations.
pub type Result<T> = std::result::Result<T, ScoutError>;

impl From<std::io::Error> for ScoutError {
    fn from(err: std::io::Error) -> Self {
        ScoutError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl ScoutError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ScoutError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Check if this error should trigger a retry.
    ///
    /// Only remote failures are retryable: the catalog is kept, so the user
    /// can resubmit the same query. File errors need a new file, and guard
    /// errors need a different action entirely.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScoutError::RemoteCallFailed { .. })
    }

    /// The HTTP status carried by a remote failure, if any.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            ScoutError::RemoteCallFailed { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScoutError::CorruptFile {
            message: "not a zip archive".into(),
        };
        assert_eq!(
            err.to_string(),
            "The file could not be read as a spreadsheet: not a zip archive"
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(ScoutError::RemoteCallFailed {
            message: "server error".into(),
            status: Some(500),
        }
        .is_retryable());
        assert!(!ScoutError::EmptyCatalog.is_retryable());
        assert!(!ScoutError::NoCatalogLoaded.is_retryable());
    }

    #[test]
    fn test_remote_status() {
        let err = ScoutError::RemoteCallFailed {
            message: "gateway timeout".into(),
            status: Some(504),
        };
        assert_eq!(err.remote_status(), Some(504));
        assert_eq!(ScoutError::EmptyCatalog.remote_status(), None);
    }

    #[test]
    fn test_io_with_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ScoutError::io_with_path(io, "/tmp/catalog.xlsx");
        match err {
            ScoutError::Io { path, .. } => {
                assert_eq!(path, Some(PathBuf::from("/tmp/catalog.xlsx")));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
