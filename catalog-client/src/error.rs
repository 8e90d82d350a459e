//! Client error types

use shared::BackendError;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate resource
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other non-success status
    #[error("Request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) if e.is_decode() => BackendError::Decode(e.to_string()),
            ClientError::Http(e) => BackendError::Transport(e.to_string()),
            ClientError::Config(msg) => BackendError::Transport(msg),
            ClientError::InvalidResponse(msg) => BackendError::Decode(msg),
            ClientError::NotFound(msg) => BackendError::NotFound(msg),
            ClientError::Conflict(msg) => BackendError::Conflict(msg),
            ClientError::Rejected { status, body } => BackendError::rejected(status, body),
            ClientError::Serialization(e) => BackendError::Decode(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_map_to_backend_errors() {
        let err: BackendError = ClientError::NotFound("products".into()).into();
        assert!(matches!(err, BackendError::NotFound(_)));

        let err: BackendError = ClientError::Conflict("duplicate".into()).into();
        assert!(matches!(err, BackendError::Conflict(_)));

        let err: BackendError = ClientError::Rejected {
            status: 400,
            body: "bad column".into(),
        }
        .into();
        assert!(matches!(err, BackendError::Rejected { status: 400, .. }));
    }
}
