//! Error types for docket.

use thiserror::Error;

/// Result type alias using docket's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for docket operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Case not found
    #[error("Case not found: {0}")]
    CaseNotFound(uuid::Uuid),

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(uuid::Uuid),

    /// Input validation failed
    #[error("Validation error: {0}")]
    InvalidInput(String),

    /// Ingestion backend call failed
    #[error("Ingest error: {0}")]
    Ingest(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Document extraction failed
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("client 42".to_string());
        assert_eq!(err.to_string(), "Not found: client 42");
    }

    #[test]
    fn test_error_display_case_not_found() {
        let id = Uuid::nil();
        let err = Error::CaseNotFound(id);
        assert_eq!(err.to_string(), format!("Case not found: {}", id));
    }

    #[test]
    fn test_error_display_document_not_found() {
        let id = Uuid::new_v4();
        let err = Error::DocumentNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("caseTitle: too long".to_string());
        assert_eq!(err.to_string(), "Validation error: caseTitle: too long");
    }

    #[test]
    fn test_error_display_ingest() {
        let err = Error::Ingest("HTTP 502: Bad Gateway".to_string());
        assert_eq!(err.to_string(), "Ingest error: HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_error_display_inference() {
        let err = Error::Inference("model timeout".to_string());
        assert_eq!(err.to_string(), "Inference error: model timeout");
    }

    #[test]
    fn test_error_display_extraction() {
        let err = Error::Extraction("unsupported file type".to_string());
        assert_eq!(err.to_string(), "Extraction error: unsupported file type");
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

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }
}
