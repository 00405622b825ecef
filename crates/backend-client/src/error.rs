//! Error types for backend-client.

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Required configuration is missing (e.g., no shared secret).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backend answered with a non-success status.
    #[error("Backend returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// The requested record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Backend answered 2xx but the payload was not what we expected.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackendError {
    /// Whether this error means the record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound { .. })
    }
}
