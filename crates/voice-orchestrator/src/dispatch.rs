//! Explicit agent dispatch through the LiveKit server API.
//!
//! Workers normally receive jobs automatically. An explicit dispatch asks the
//! server to send a named agent into a specific room, with metadata the
//! orchestrator later reads as the agent id.

use call_tools::LiveKitConfig;
use livekit_api::services::agent_dispatch::AgentDispatchClient as DispatchService;
use livekit_protocol as proto;
use tracing::{debug, info};

use crate::error::DispatchError;

/// Room used when none is given.
pub const DEFAULT_DISPATCH_ROOM: &str = "voice-assistant-room";
/// Worker agent name used when none is given.
pub const DEFAULT_DISPATCH_AGENT: &str = "agent";
/// Agent id written into metadata when none is given.
pub const MANUAL_DISPATCH_AGENT_ID: &str = "manual-dispatch";

/// Request to send an agent into a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDispatchRequest {
    pub agent_name: String,
    pub room: String,
    pub metadata: String,
}

impl CreateDispatchRequest {
    /// Dispatch `agent_name` into `room`, carrying `agent_id` as JSON metadata.
    pub fn new(agent_name: impl Into<String>, room: impl Into<String>, agent_id: &str) -> Self {
        Self {
            agent_name: agent_name.into(),
            room: room.into(),
            metadata: serde_json::json!({ "agent_id": agent_id }).to_string(),
        }
    }
}

impl Default for CreateDispatchRequest {
    fn default() -> Self {
        Self::new(
            DEFAULT_DISPATCH_AGENT,
            DEFAULT_DISPATCH_ROOM,
            MANUAL_DISPATCH_AGENT_ID,
        )
    }
}

impl From<&CreateDispatchRequest> for proto::CreateAgentDispatchRequest {
    fn from(request: &CreateDispatchRequest) -> Self {
        proto::CreateAgentDispatchRequest {
            agent_name: request.agent_name.clone(),
            room: request.room.clone(),
            metadata: request.metadata.clone(),
            ..Default::default()
        }
    }
}

/// A dispatch as the server reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDispatch {
    pub id: String,
    pub agent_name: String,
    pub room: String,
    pub metadata: String,
}

impl From<proto::AgentDispatch> for AgentDispatch {
    fn from(dispatch: proto::AgentDispatch) -> Self {
        Self {
            id: dispatch.id,
            agent_name: dispatch.agent_name,
            room: dispatch.room,
            metadata: dispatch.metadata,
        }
    }
}

/// Creates and lists agent dispatches.
pub struct AgentDispatchClient {
    config: LiveKitConfig,
    service: DispatchService,
}

impl AgentDispatchClient {
    pub fn new(config: LiveKitConfig) -> Self {
        let service =
            DispatchService::with_api_key(&config.http_url(), &config.api_key, &config.api_secret);
        Self { config, service }
    }

    /// Whether URL, key and secret are all present.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn ensure_configured(&self) -> Result<(), DispatchError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(DispatchError::Configuration(
                "LIVEKIT_URL, LIVEKIT_API_KEY and LIVEKIT_API_SECRET must be set".to_string(),
            ))
        }
    }

    /// Create a dispatch.
    pub async fn create_dispatch(
        &self,
        request: &CreateDispatchRequest,
    ) -> Result<AgentDispatch, DispatchError> {
        self.ensure_configured()?;
        debug!("Create dispatch request: {:?}", request);

        let dispatch: AgentDispatch = self
            .service
            .create_dispatch(request.into())
            .await
            .map_err(|e| DispatchError::Service(e.to_string()))?
            .into();
        info!(
            "Created dispatch {} for agent '{}' in room {}",
            dispatch.id, dispatch.agent_name, dispatch.room
        );
        Ok(dispatch)
    }

    /// List the dispatches of a room.
    pub async fn list_dispatches(&self, room: &str) -> Result<Vec<AgentDispatch>, DispatchError> {
        self.ensure_configured()?;

        let dispatches: Vec<AgentDispatch> = self
            .service
            .list_dispatch(room)
            .await
            .map_err(|e| DispatchError::Service(e.to_string()))?
            .into_iter()
            .map(AgentDispatch::from)
            .collect();
        debug!("Room {} has {} dispatches", room, dispatches.len());
        Ok(dispatches)
    }
}

impl std::fmt::Debug for AgentDispatchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentDispatchClient")
            .field("config", &self.config)
            .finish()
    }
}
