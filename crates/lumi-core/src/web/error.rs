//! HTTP error handling for the web API.
//!
//! Core errors become JSON bodies carrying the stable error code, so the UI
//! can tell a cancelled dialog from a real failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Non-standard status for requests the user cancelled.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// API error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Error code (e.g. "h5p-not-found")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Create a new API error with code and message.
    #[must_use]
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.code.as_deref() {
            Some("user-abort") => StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
                .unwrap_or(StatusCode::BAD_REQUEST),
            Some("h5p-not-found") => StatusCode::NOT_FOUND,
            Some("file-not-selected") => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

impl From<crate::error::Error> for ApiError {
    fn from(err: crate::error::Error) -> Self {
        Self {
            code: err.code().map(String::from),
            message: err.to_string(),
        }
    }
}

/// Result type for web handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            ApiError::from(Error::UserAborted).status_code().as_u16(),
            CLIENT_CLOSED_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::ContentNotFound("1".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(Error::HandleNotResolved("h".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::WriteFailure("disk full".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::new("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_core_error() {
        let api_err: ApiError = Error::ContentNotFound("42".into()).into();
        assert_eq!(api_err.code, Some("h5p-not-found".into()));
        assert!(api_err.message.contains("42"));
    }

    #[test]
    fn test_serialization() {
        let err = ApiError::with_code("user-abort", "aborted by user");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"code\":\"user-abort\""));
        assert!(json.contains("\"message\":\"aborted by user\""));

        let json = serde_json::to_string(&ApiError::new("plain")).unwrap();
        assert!(!json.contains("code"));
    }
}
