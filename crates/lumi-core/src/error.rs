//! Error types for Lumi.
//!
//! This module provides a unified error type for all bridge operations,
//! with specific variants for the outcomes callers are expected to handle.

use std::io;

use thiserror::Error;

/// A specialized `Result` type for Lumi operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Lumi.
#[derive(Error, Debug)]
pub enum Error {
    /// The user cancelled an interactive picker
    #[error("aborted by user")]
    UserAborted,

    /// Content id has no backing storage
    #[error("content '{0}' not found")]
    ContentNotFound(String),

    /// File handle id is unknown to the registry
    #[error("file handle '{0}' was not selected before")]
    HandleNotResolved(String),

    /// Handle registration would break the id-to-path mapping
    #[error("invalid file handle: {0}")]
    InvalidHandle(String),

    /// The package stream or serializer failed
    #[error("failed to write package: {0}")]
    WriteFailure(String),

    /// Package bytes could not be parsed
    #[error("invalid package: {0}")]
    InvalidPackage(String),

    /// Configuration file error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the stable error code reported to the UI, if any.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::UserAborted => Some("user-abort"),
            Self::ContentNotFound(_) => Some("h5p-not-found"),
            Self::HandleNotResolved(_) => Some("file-not-selected"),
            Self::WriteFailure(_) => Some("write-failure"),
            Self::InvalidPackage(_) => Some("invalid-package"),
            _ => None,
        }
    }

    /// Whether this is the benign "user cancelled the dialog" outcome.
    #[must_use]
    pub const fn is_user_abort(&self) -> bool {
        matches!(self, Self::UserAborted)
    }

    /// Returns whether the caller may reasonably retry (re-prompt or re-check).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UserAborted | Self::ContentNotFound(_) | Self::HandleNotResolved(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Self::InvalidPackage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::UserAborted.code(), Some("user-abort"));
        assert_eq!(
            Error::ContentNotFound("1".into()).code(),
            Some("h5p-not-found")
        );
        assert_eq!(Error::Internal("x".into()).code(), None);
    }

    #[test]
    fn test_user_abort_is_benign() {
        assert!(Error::UserAborted.is_user_abort());
        assert!(Error::UserAborted.is_recoverable());
        assert!(!Error::WriteFailure("disk full".into()).is_recoverable());
    }

    #[test]
    fn test_display_includes_id() {
        let err = Error::HandleNotResolved("h42".into());
        assert!(err.to_string().contains("h42"));
    }
}
