//! Error types for orchestrator operations.

use backend_client::BackendError;
use thiserror::Error;

/// Errors that can occur while handling a call.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The voice runtime failed (connect, participant wait, session).
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Backend call failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Errors from the agent dispatch API.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// LiveKit credentials are missing.
    #[error("dispatch not configured: {0}")]
    Configuration(String),

    /// The dispatch service call failed.
    #[error("dispatch service error: {0}")]
    Service(String),
}
