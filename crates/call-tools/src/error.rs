//! Error types for tool operations.

use thiserror::Error;

/// Errors that can occur during tool execution.
///
/// Provider failures never surface here: tools answer them with a
/// failure [`ToolOutput`](crate::ToolOutput) the caller can hear.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool not found in registry.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Missing required parameter.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// Invalid parameter value.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Tool arguments were not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the calendar provider.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// No credential file configured.
    #[error("Calendar not configured: {0}")]
    Configuration(String),

    /// Credential file missing, unreadable or malformed.
    #[error("Invalid service account credentials: {0}")]
    Credentials(String),

    /// Signing the token request failed.
    #[error("Token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The token endpoint refused the grant.
    #[error("Token request rejected (HTTP {status}): {body}")]
    Auth { status: u16, body: String },

    /// The calendar API answered with a non-success status.
    #[error("Calendar API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the telephony control plane.
#[derive(Debug, Error)]
pub enum TelephonyError {
    /// LiveKit credentials are missing.
    #[error("Telephony not configured: {0}")]
    Configuration(String),

    /// Could not mint an access token.
    #[error("Access token error: {0}")]
    Token(#[from] livekit_api::access_token::AccessTokenError),

    /// The SIP leg reported a failure.
    #[error("SIP error {status_code}: {status}")]
    Sip { status_code: String, status: String },

    /// The server API answered with a non-success status.
    #[error("LiveKit returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
