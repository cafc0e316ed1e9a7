//! Error types for merge patch computation.

use crate::fieldpath::PathParseError;
use thiserror::Error;

/// PatchError is returned by every fallible operation of the engine.
#[derive(Debug, Error)]
pub enum PatchError {
    /// An input could not be interpreted as a document.
    #[error("malformed document at {path}: {message}")]
    MalformedDocument { path: String, message: String },

    /// The computed overlay could not be serialized.
    #[error("failed to encode merge patch: {0}")]
    EncodingFailure(String),

    /// The target of an apply does not structurally admit the overlay.
    #[error("cannot apply merge patch at {path}: {message}")]
    ApplyConflict { path: String, message: String },

    #[error("invalid path expression: {0}")]
    InvalidPath(#[from] PathParseError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PatchError {
    /// Creates a malformed document error.
    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        PatchError::MalformedDocument {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an apply conflict error.
    pub fn conflict(path: impl Into<String>, message: impl Into<String>) -> Self {
        PatchError::ApplyConflict {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns true if this is a malformed document error.
    pub fn is_malformed(&self) -> bool {
        matches!(self, PatchError::MalformedDocument { .. })
    }

    /// Returns true if this is an apply conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, PatchError::ApplyConflict { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PatchError::malformed(".spec.map", "entry is not a scalar");
        assert_eq!(
            err.to_string(),
            "malformed document at .spec.map: entry is not a scalar"
        );
        assert!(err.is_malformed());
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_conflict_display() {
        let err = PatchError::conflict(".spec", "target holds a string");
        assert!(err.to_string().contains("cannot apply merge patch at .spec"));
        assert!(err.is_conflict());
    }
}
