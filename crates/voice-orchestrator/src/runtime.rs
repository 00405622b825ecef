//! Boundary with the voice runtime.
//!
//! The runtime owns rooms, media and the speech models. The orchestrator
//! only sees it through [`JobContext`] (one per dispatched job) and
//! [`SessionRunner`] (runs a configured session to completion).

use std::collections::HashMap;

use async_trait::async_trait;
use backend_client::ToolExecution;
use call_tools::{ToolRegistry, UNKNOWN_PHONE_NUMBER};
use serde::Deserialize;
use serde_json::Value;

use crate::error::OrchestratorError;
use crate::session::SessionConfig;

/// Attribute carrying the backend agent id.
pub const AGENT_ID_ATTRIBUTE: &str = "agent_id";
/// Attribute carrying a SIP caller's number.
pub const SIP_PHONE_ATTRIBUTE: &str = "sip.phoneNumber";
const SIP_ATTRIBUTE_PREFIX: &str = "sip.";

/// What kind of endpoint a participant is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticipantKind {
    #[default]
    Standard,
    Sip,
    Ingress,
    Egress,
    Agent,
}

/// A remote participant in the call's room.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Participant {
    pub identity: String,
    pub kind: ParticipantKind,
    pub attributes: HashMap<String, String>,
}

impl Participant {
    pub fn new(identity: impl Into<String>, kind: ParticipantKind) -> Self {
        Self {
            identity: identity.into(),
            kind,
            attributes: HashMap::new(),
        }
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// SIP callers are marked by kind or by any `sip.*` attribute.
    pub fn is_sip(&self) -> bool {
        self.kind == ParticipantKind::Sip
            || self
                .attributes
                .keys()
                .any(|k| k.starts_with(SIP_ATTRIBUTE_PREFIX))
    }

    /// The caller's number, or "Unknown".
    pub fn phone_number(&self) -> String {
        self.attributes
            .get(SIP_PHONE_ATTRIBUTE)
            .filter(|n| !n.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_PHONE_NUMBER.to_string())
    }

    /// Agent id set on the participant by the dialing side.
    pub fn agent_id(&self) -> Option<&str> {
        self.attributes
            .get(AGENT_ID_ATTRIBUTE)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// Agent id from job metadata: either a JSON object with an `agent_id`
/// field or the bare id.
pub fn agent_id_from_metadata(metadata: &str) -> Option<String> {
    let metadata = metadata.trim();
    if metadata.is_empty() {
        return None;
    }
    if metadata.starts_with('{') {
        let value: Value = serde_json::from_str(metadata).ok()?;
        return match value.get(AGENT_ID_ATTRIBUTE)? {
            Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        };
    }
    Some(metadata.to_string())
}

/// Inbound audio noise cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseCancellation {
    /// Background voice cancellation for wideband audio.
    Standard,
    /// Variant tuned for narrowband phone audio.
    Telephony,
}

impl NoiseCancellation {
    /// Telephony profile for SIP callers, standard otherwise.
    pub fn for_participant(participant: &Participant) -> Self {
        if participant.is_sip() {
            NoiseCancellation::Telephony
        } else {
            NoiseCancellation::Standard
        }
    }
}

/// What the agent says first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    pub instructions: String,
    pub allow_interruptions: bool,
}

impl Greeting {
    /// Speak `greeting_prompt` verbatim, without letting the caller cut in.
    pub fn say(greeting_prompt: &str) -> Self {
        Self {
            instructions: format!("Say: {}", greeting_prompt),
            allow_interruptions: false,
        }
    }
}

/// Everything needed to start one session.
#[derive(Debug)]
pub struct SessionRequest {
    pub room_name: String,
    pub participant_identity: String,
    /// System prompt for the assistant.
    pub instructions: String,
    pub greeting: Greeting,
    pub config: SessionConfig,
    /// Tools bound to this call's context.
    pub tools: ToolRegistry,
    pub noise_cancellation: NoiseCancellation,
}

/// A conversation turn as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ConversationItem {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub interrupted: bool,
}

impl ConversationItem {
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: vec![text.into()],
            interrupted: false,
        }
    }

    /// The item's text parts joined with spaces.
    pub fn text(&self) -> String {
        self.content.join(" ")
    }
}

/// An event recorded during a session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    ConversationItemAdded { item: ConversationItem },
    FunctionToolsExecuted { calls: Vec<ToolExecution> },
    /// Anything else (state changes, metrics...).
    #[serde(other)]
    Other,
}

/// Returned by the runner once the call has ended.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SessionReport {
    #[serde(default)]
    pub events: Vec<SessionEvent>,
}

/// One dispatched job: a room the worker was asked to join.
#[async_trait]
pub trait JobContext: Send + Sync {
    fn room_name(&self) -> &str;

    /// Metadata attached when the job was dispatched.
    fn job_metadata(&self) -> Option<&str>;

    /// Join the room.
    async fn connect(&self) -> Result<(), OrchestratorError>;

    /// Wait until the first remote participant has joined.
    async fn wait_for_participant(&self) -> Result<Participant, OrchestratorError>;
}

/// Runs a session until the call ends.
#[async_trait]
pub trait SessionRunner: Send + Sync {
    async fn run_session(&self, request: SessionRequest) -> Result<SessionReport, OrchestratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sip_by_kind() {
        let caller = Participant::new("sip_+15551234567", ParticipantKind::Sip)
            .with_attribute(SIP_PHONE_ATTRIBUTE, "+15551234567");
        assert!(caller.is_sip());
        assert_eq!(caller.phone_number(), "+15551234567");
        assert_eq!(
            NoiseCancellation::for_participant(&caller),
            NoiseCancellation::Telephony
        );
    }

    #[test]
    fn test_sip_by_attribute() {
        let caller = Participant::new("caller", ParticipantKind::Standard)
            .with_attribute("sip.trunkID", "ST_abc");
        assert!(caller.is_sip());
        assert_eq!(caller.phone_number(), "Unknown");
    }

    #[test]
    fn test_web_participant() {
        let user = Participant::new("web-user", ParticipantKind::Standard)
            .with_attribute(AGENT_ID_ATTRIBUTE, " agent-9 ");
        assert!(!user.is_sip());
        assert_eq!(user.phone_number(), "Unknown");
        assert_eq!(user.agent_id(), Some("agent-9"));
        assert_eq!(
            NoiseCancellation::for_participant(&user),
            NoiseCancellation::Standard
        );
    }

    #[test]
    fn test_agent_id_from_metadata() {
        assert_eq!(
            agent_id_from_metadata(r#"{"agent_id": "manual-dispatch"}"#),
            Some("manual-dispatch".to_string())
        );
        assert_eq!(
            agent_id_from_metadata(r#"{"agent_id": 42}"#),
            Some("42".to_string())
        );
        assert_eq!(agent_id_from_metadata("agent-7"), Some("agent-7".to_string()));
        assert_eq!(agent_id_from_metadata("  "), None);
        assert_eq!(agent_id_from_metadata(r#"{"other": 1}"#), None);
        assert_eq!(agent_id_from_metadata("{not json"), None);
    }

    #[test]
    fn test_greeting() {
        let greeting = Greeting::say("Hello, thanks for calling!");
        assert_eq!(greeting.instructions, "Say: Hello, thanks for calling!");
        assert!(!greeting.allow_interruptions);
    }

    #[test]
    fn test_report_deserializes_unknown_events() {
        let report: SessionReport = serde_json::from_str(
            r#"{"events": [
                {"type": "agent_state_changed", "new_state": "speaking"},
                {"type": "conversation_item_added",
                 "item": {"role": "assistant", "content": ["Hello", "there"]}},
                {"type": "function_tools_executed",
                 "calls": [{"name": "call_forward", "arguments": {}, "output": "ok"}]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(report.events.len(), 3);
        assert_eq!(report.events[0], SessionEvent::Other);
        match &report.events[1] {
            SessionEvent::ConversationItemAdded { item } => assert_eq!(item.text(), "Hello there"),
            other => panic!("Expected conversation item, got {:?}", other),
        }
    }
}
