//! Error types for overlay path resolution.
//!
//! Lookups that find nothing are not errors: they return `None` or an empty
//! `Vec`. Only registration failures, I/O failures that cannot be read as
//! "absent", rejected glob patterns and parser failures surface here.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error produced by a caller-supplied parser.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for the overlay-paths library.
#[derive(Debug, Error)]
pub enum OverlayError {
    // Registration errors
    #[error("{} must be a directory", .0.display())]
    NotADirectory(PathBuf),

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Glob errors
    #[error("Invalid glob pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },

    // Structured file errors
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

/// Result type alias for overlay-paths operations.
pub type Result<T> = std::result::Result<T, OverlayError>;

impl From<std::io::Error> for OverlayError {
    fn from(err: std::io::Error) -> Self {
        OverlayError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<glob::GlobError> for OverlayError {
    fn from(err: glob::GlobError) -> Self {
        let path = err.path().to_path_buf();
        OverlayError::io_with_path(err.into_error(), path)
    }
}

impl OverlayError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        OverlayError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Wrap a parser failure for the file at `path`.
    pub fn parse(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        OverlayError::Parse {
            path: path.into(),
            source: source.into(),
        }
    }

    /// The path this error refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            OverlayError::NotADirectory(path) | OverlayError::Parse { path, .. } => Some(path),
            OverlayError::Io { path, .. } => path.as_deref(),
            OverlayError::Pattern { .. } => None,
        }
    }

    /// Check if this error came from the caller's parser.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, OverlayError::Parse { .. })
    }
}
