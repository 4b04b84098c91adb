//! Unified error type for the reelhouse application.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`].

use std::fmt;
use std::path::PathBuf;

/// Unified error type covering all failure modes in reelhouse.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested catalog entry could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "movie").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The catalog entry exists but its backing file cannot be read.
    #[error("Video file not found on server")]
    FileUnavailable {
        /// Path recorded in the catalog.
        path: PathBuf,
    },

    /// The requested byte range lies outside the file.
    #[error("Range not satisfiable for resource of {size} bytes")]
    RangeNotSatisfiable {
        /// Total size of the resource in bytes.
        size: u64,
    },

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::FileUnavailable { .. } => 404,
            Error::RangeNotSatisfiable { .. } => 416,
            Error::Validation(_) => 422,
            Error::Database { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::FileUnavailable`].
    pub fn file_unavailable(path: impl Into<PathBuf>) -> Self {
        Error::FileUnavailable { path: path.into() }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("movie", "abc-123");
        assert_eq!(err.to_string(), "movie not found: abc-123");
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn file_unavailable_is_distinct_404() {
        let err = Error::file_unavailable("/media/gone.mp4");
        assert_eq!(err.to_string(), "Video file not found on server");
        assert_eq!(err.http_status(), 404);
        assert_ne!(err.to_string(), Error::not_found("movie", "x").to_string());
    }

    #[test]
    fn range_not_satisfiable_status() {
        let err = Error::RangeNotSatisfiable { size: 1000 };
        assert_eq!(err.http_status(), 416);
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn validation_display() {
        let err = Error::Validation("title is required".into());
        assert_eq!(err.to_string(), "Validation error: title is required");
        assert_eq!(err.http_status(), 422);
    }

    #[test]
    fn database_display() {
        let err = Error::database("connection refused");
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn internal_display() {
        let err = Error::Internal("unexpected state".into());
        assert_eq!(err.to_string(), "Internal error: unexpected state");
        assert_eq!(err.http_status(), 500);
    }
}
