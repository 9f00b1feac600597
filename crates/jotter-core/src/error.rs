//! Error types for jotter.

use thiserror::Error;

use crate::codes::ErrorCode;
use crate::quota::QuotaViolation;

/// Result type alias using jotter's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for jotter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note not found (or owned by another user)
    #[error("Note not found: {0}")]
    NoteNotFound(i64),

    /// A storage ceiling would be exceeded
    #[error("Quota exceeded: {0}")]
    Quota(#[from] QuotaViolation),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Envelope error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Quota(violation) => violation.code(),
            Error::NotFound(_) | Error::NoteNotFound(_) => ErrorCode::NOT_FOUND,
            Error::InvalidInput(_) => ErrorCode::INVALID_REQUEST_BODY,
            Error::Database(_) => ErrorCode::SAVE_DATA,
            Error::Serialization(_) => ErrorCode::INTERNAL_DATA_JSON_MALFORMED,
            _ => ErrorCode::UNKNOWN,
        }
    }

    /// Message safe to show to the end user.
    ///
    /// Infrastructure failures collapse to the code's generic message so
    /// driver details never reach the client.
    pub fn public_message(&self) -> String {
        match self {
            Error::Quota(violation) => violation.message(),
            Error::NotFound(msg) | Error::InvalidInput(msg) => msg.clone(),
            Error::NoteNotFound(id) => format!("Note {} not found", id),
            _ => self.code().message().to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_note_not_found() {
        let err = Error::NoteNotFound(42);
        assert_eq!(err.to_string(), "Note not found: 42");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("Attachment name is required".to_string());
        assert_eq!(err.to_string(), "Invalid input: Attachment name is required");
    }

    #[test]
    fn test_quota_error_keeps_violation_code() {
        let err: Error = QuotaViolation::Note {
            size: 20,
            max_size: 10,
        }
        .into();
        assert_eq!(err.code(), ErrorCode::NOTE_SIZE_QUOTA_EXCEED);
        assert!(err.public_message().contains("size of the note"));
    }

    #[test]
    fn test_codes_for_plain_errors() {
        assert_eq!(Error::NoteNotFound(1).code(), ErrorCode::NOT_FOUND);
        assert_eq!(
            Error::InvalidInput("x".into()).code(),
            ErrorCode::INVALID_REQUEST_BODY
        );
        assert_eq!(Error::Internal("x".into()).code(), ErrorCode::UNKNOWN);
    }

    #[test]
    fn test_public_message_hides_internal_details() {
        let err = Error::Internal("connection reset by peer at 10.0.0.3".into());
        assert_eq!(err.public_message(), "Unknown error");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
