//! Agent record returned by `GET /agents/get/{id}`.

use std::fmt;

use serde::Deserialize;

use crate::de::opt_string_or_number;

/// Display name used when the backend omits one.
pub const DEFAULT_AGENT_NAME: &str = "Assistant";

/// Voice used when the backend omits one.
pub const DEFAULT_VOICE: &str = "alloy";

/// Which session bundle an agent runs on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AgentType {
    /// Speech-to-speech realtime model.
    #[default]
    Realtime,
    /// Separate STT, LLM and TTS stages with turn detection.
    Custom,
    /// Explicitly requested fallback bundle.
    Fallback,
    /// A tag this build does not know about.
    Other(String),
}

impl AgentType {
    /// Parse a backend agent-type tag. Matching is case-insensitive.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "realtime" => AgentType::Realtime,
            "custom" => AgentType::Custom,
            "fallback" => AgentType::Fallback,
            _ => AgentType::Other(tag.to_string()),
        }
    }

    /// The tag as the backend spells it.
    pub fn as_str(&self) -> &str {
        match self {
            AgentType::Realtime => "realtime",
            AgentType::Custom => "custom",
            AgentType::Fallback => "fallback",
            AgentType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw agent payload. Every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
struct AgentRecord {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    agent_type: Option<String>,
    #[serde(default)]
    voice: Option<String>,
    #[serde(default)]
    greeting_prompt: Option<String>,
    #[serde(default)]
    system_prompt: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    user_id: Option<String>,
    #[serde(default, alias = "openai_api_key")]
    api_key: Option<String>,
    #[serde(default, alias = "tools_id", deserialize_with = "opt_string_or_number")]
    tool_id: Option<String>,
}

/// Agent configuration for a single call.
///
/// Immutable once fetched. Absent or blank optional fields are replaced by
/// documented defaults: name "Assistant", type "realtime", voice "alloy".
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "AgentRecord")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub agent_type: AgentType,
    pub voice: String,
    pub greeting_prompt: String,
    pub system_prompt: String,
    /// Owning user id (used by the business-hours check).
    pub user_id: Option<String>,
    /// Provider credential for realtime models.
    pub api_key: Option<String>,
    /// Tool-set reference, if the agent has tools.
    pub tool_id: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl From<AgentRecord> for Agent {
    fn from(record: AgentRecord) -> Self {
        Self {
            id: record.id.unwrap_or_default(),
            name: non_blank(record.name).unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string()),
            agent_type: non_blank(record.agent_type)
                .map(|tag| AgentType::from_tag(&tag))
                .unwrap_or_default(),
            voice: non_blank(record.voice).unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            greeting_prompt: record.greeting_prompt.unwrap_or_default(),
            system_prompt: record.system_prompt.unwrap_or_default(),
            user_id: non_blank(record.user_id),
            api_key: non_blank(record.api_key),
            tool_id: non_blank(record.tool_id),
        }
    }
}

impl Agent {
    /// Create an agent with defaults for everything but the id.
    pub fn new(id: impl Into<String>) -> Self {
        let mut agent = Agent::from(AgentRecord::default());
        agent.id = id.into();
        agent
    }

    /// Set the agent type.
    pub fn with_type(mut self, agent_type: AgentType) -> Self {
        self.agent_type = agent_type;
        self
    }

    /// Set the voice.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Set the system and greeting prompts.
    pub fn with_prompts(
        mut self,
        system_prompt: impl Into<String>,
        greeting_prompt: impl Into<String>,
    ) -> Self {
        self.system_prompt = system_prompt.into();
        self.greeting_prompt = greeting_prompt.into();
        self
    }

    /// Set the owning user id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the provider credential.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the tool-set reference.
    pub fn with_tool_id(mut self, tool_id: impl Into<String>) -> Self {
        self.tool_id = Some(tool_id.into());
        self
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("agent_type", &self.agent_type)
            .field("voice", &self.voice)
            .field("user_id", &self.user_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("tool_id", &self.tool_id)
            .finish()
    }
}
