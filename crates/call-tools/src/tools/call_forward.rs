//! Call forwarding via SIP transfer.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::config::TransferConfig;
use crate::error::{TelephonyError, ToolError};
use crate::telephony::{CallTransfer, TransferRequest};
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Transfers the caller to the configured destination.
pub struct CallForward {
    transfer: Arc<dyn CallTransfer>,
    config: TransferConfig,
}

impl CallForward {
    pub fn new(transfer: Arc<dyn CallTransfer>, config: TransferConfig) -> Self {
        Self { transfer, config }
    }
}

#[async_trait]
impl Tool for CallForward {
    fn name(&self) -> &str {
        "call_forward"
    }

    fn description(&self) -> &str {
        "Forwards the current call to another phone number."
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let Some((room_name, identity)) = args.context.transfer_target() else {
            warn!("call_forward invoked without room or participant");
            return Ok(ToolOutput::failure("Could not find room or participant."));
        };

        let request = TransferRequest {
            participant_identity: identity.to_string(),
            room_name: room_name.to_string(),
            transfer_to: self.config.destination.clone(),
            play_dialtone: self.config.play_dialtone,
        };

        match self.transfer.transfer(&request).await {
            Ok(()) => Ok(ToolOutput::success("Transferring your call now.")),
            Err(TelephonyError::Sip {
                status_code,
                status,
            }) => {
                error!("SIP transfer failed: {} {}", status_code, status);
                Ok(ToolOutput::failure("Sorry, I couldn't transfer the call."))
            }
            Err(e) => {
                error!("Error transferring SIP participant: {}", e);
                Ok(ToolOutput::failure("Sorry, I couldn't transfer the call."))
            }
        }
    }
}
