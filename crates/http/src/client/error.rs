//! Client error types

use super::refresh::RefreshError;
use super::token_store::StorageError;
use medibook_core::{CoreError, ValidationError};
use thiserror::Error;

/// Shown when the backend gives no usable `message`
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired, please sign in again";

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The access token was rejected and could not be refreshed
    #[error("Session expired: {0}")]
    SessionExpired(#[source] RefreshError),

    /// Form input rejected before any request was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Token persistence failed
    #[error("Token storage error: {0}")]
    Storage(#[from] StorageError),

    /// Response payload did not match the expected shape
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// HTTP status behind the error, when the backend answered
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for a toast or a CLI error line
    pub fn user_message(&self) -> String {
        match self {
            Self::BadRequest(message)
            | Self::AuthenticationFailed(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::ServerError { message, .. } => message.clone(),
            Self::SessionExpired(_) => SESSION_EXPIRED_MESSAGE.to_string(),
            Self::Validation(err) => err.to_string(),
            Self::Configuration(_) | Self::Storage(_) => self.to_string(),
            Self::Request(_) | Self::Serialization(_) | Self::Core(_) => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }
}

/// Pull the `message` field out of an error body
pub(crate) fn message_from_body(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_mapping() {
        let err = ClientError::from_status(StatusCode::NOT_FOUND, "Doctor not found".into());
        assert!(matches!(err, ClientError::NotFound(_)));
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.user_message(), "Doctor not found");

        let err = ClientError::from_status(StatusCode::CONFLICT, "Slot already booked".into());
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_message_from_body() {
        assert_eq!(
            message_from_body(br#"{"message":"Invalid credentials","status":401}"#),
            "Invalid credentials"
        );
        assert_eq!(message_from_body(b"<html>Bad Gateway</html>"), GENERIC_ERROR_MESSAGE);
        assert_eq!(message_from_body(br#"{"message":""}"#), GENERIC_ERROR_MESSAGE);
        assert_eq!(message_from_body(b""), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_session_expired_has_fixed_user_message() {
        let err = ClientError::SessionExpired(RefreshError::MissingRefreshToken);
        assert_eq!(err.user_message(), SESSION_EXPIRED_MESSAGE);
        assert!(err.status().is_none());
    }

    #[test]
    fn test_validation_errors_pass_through() {
        let err = ClientError::from(ValidationError::InvalidEmail);
        assert_eq!(err.user_message(), "Email address is not valid");
    }
}
