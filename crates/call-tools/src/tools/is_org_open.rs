//! Business-hours check through the backend.

use std::sync::Arc;

use async_trait::async_trait;
use backend_client::{BackendApi, BackendError};
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Reply when the backend secret is not configured.
pub const BUSINESS_STATUS_UNAVAILABLE: &str = "Business status is currently unavailable.";

/// Answers whether the agent owner's organization is open.
///
/// Replies with `{"status": "open"|"closed", "timestamp": ...}`, or
/// `{"status": "error", ...}` when the backend cannot be reached.
pub struct IsOrgOpen {
    backend: Arc<dyn BackendApi>,
}

impl IsOrgOpen {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self { backend }
    }

    /// Every failure answers `{"status": "error", "message": ...}`.
    fn error_payload(err: &BackendError) -> ToolOutput {
        let payload = match err {
            BackendError::Configuration(_) => json!({
                "status": "error",
                "message": BUSINESS_STATUS_UNAVAILABLE,
            }),
            BackendError::UnexpectedResponse(message) => json!({
                "status": "error",
                "message": message,
            }),
            other => json!({
                "status": "error",
                "message": "Unable to check business status.",
                "error": other.to_string(),
            }),
        };
        ToolOutput::failure(payload.to_string())
    }
}

#[async_trait]
impl Tool for IsOrgOpen {
    fn name(&self) -> &str {
        "is_org_open"
    }

    fn description(&self) -> &str {
        "Check if the business is open currently or at a specific time."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "target_time": {
                    "type": "string",
                    "description": "Optional ISO format datetime string (e.g., '2023-10-27T10:00:00'). If not provided, checks the current time."
                }
            }
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let user_id = args.context.user_id.as_deref();
        if user_id.is_none() {
            warn!("No user_id in call context for business-hours check");
        }

        let target_time = match args.get_string_opt("target_time") {
            Some(time) => time,
            None => match self.backend.server_time().await {
                Ok(time) => time,
                Err(e) => {
                    error!("Error fetching server time: {}", e);
                    return Ok(Self::error_payload(&e));
                }
            },
        };

        match self.backend.is_org_open(user_id, &target_time).await {
            Ok(open) => {
                let payload = json!({
                    "status": if open { "open" } else { "closed" },
                    "timestamp": target_time,
                });
                Ok(ToolOutput::success(payload.to_string()))
            }
            Err(e) => {
                error!("Error checking business status: {}", e);
                Ok(Self::error_payload(&e))
            }
        }
    }
}
