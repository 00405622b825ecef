//! Session configuration: which speech models a call runs on.
//!
//! [`build_session`] is a pure mapping from an [`Agent`] to a
//! [`SessionConfig`]. Three bundles exist:
//!
//! - realtime: a speech-to-speech model with the agent's voice and key
//! - custom: separate STT, LLM and TTS stages plus turn detection
//! - fallback: realtime with the voice defaulted to "alloy"
//!
//! Agent types this build does not recognize get the fallback bundle.

use std::sync::Arc;
use std::time::Duration;

use backend_client::{Agent, AgentType, DEFAULT_VOICE};
use serde::Serialize;
use tracing::{info, warn};

/// Speech-to-text model of the custom pipeline.
pub const PIPELINE_STT_MODEL: &str = "assemblyai/universal-streaming";
/// Language the custom pipeline transcribes.
pub const PIPELINE_STT_LANGUAGE: &str = "en";
/// LLM of the custom pipeline.
pub const PIPELINE_LLM_MODEL: &str = "openai/gpt-4.1-mini";
/// Text-to-speech model of the custom pipeline.
pub const PIPELINE_TTS_MODEL: &str = "cartesia/sonic-3";
/// Voice of the custom pipeline.
pub const PIPELINE_TTS_VOICE: &str = "9626c31c-bec5-4cca-baa8-f8ba9e84c8bc";

/// Silero voice-activity detection settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VadSettings {
    pub model: &'static str,
    pub min_speech_duration: Duration,
    pub min_silence_duration: Duration,
    pub prefix_padding_duration: Duration,
    pub activation_threshold: f32,
    pub sample_rate: u32,
}

impl Default for VadSettings {
    fn default() -> Self {
        Self {
            model: "silero",
            min_speech_duration: Duration::from_millis(50),
            min_silence_duration: Duration::from_millis(550),
            prefix_padding_duration: Duration::from_millis(500),
            activation_threshold: 0.5,
            sample_rate: 16_000,
        }
    }
}

/// Load the VAD model settings once per worker process.
///
/// Every session built afterwards shares the returned handle.
pub fn prewarm() -> Arc<VadSettings> {
    let vad = VadSettings::default();
    info!(
        "Prewarmed {} VAD (threshold {}, {} Hz)",
        vad.model, vad.activation_threshold, vad.sample_rate
    );
    Arc::new(vad)
}

/// A speech-to-speech model.
#[derive(Clone, PartialEq, Serialize)]
pub struct RealtimeModel {
    pub provider: &'static str,
    pub voice: String,
    /// Provider credential; the runtime's own default applies when None.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for RealtimeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeModel")
            .field("provider", &self.provider)
            .field("voice", &self.voice)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// How end of turn is detected in the custom pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDetection {
    Multilingual,
}

/// Separate STT, LLM and TTS stages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineModels {
    pub stt_model: String,
    pub stt_language: String,
    pub llm_model: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub turn_detection: TurnDetection,
    /// Let the LLM start answering before the end of turn is confirmed.
    pub preemptive_generation: bool,
}

impl Default for PipelineModels {
    fn default() -> Self {
        Self {
            stt_model: PIPELINE_STT_MODEL.to_string(),
            stt_language: PIPELINE_STT_LANGUAGE.to_string(),
            llm_model: PIPELINE_LLM_MODEL.to_string(),
            tts_model: PIPELINE_TTS_MODEL.to_string(),
            tts_voice: PIPELINE_TTS_VOICE.to_string(),
            turn_detection: TurnDetection::Multilingual,
            preemptive_generation: true,
        }
    }
}

/// The model stack of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "bundle", rename_all = "snake_case")]
pub enum SessionBundle {
    Realtime(RealtimeModel),
    Pipeline(PipelineModels),
}

/// Everything the runtime needs to start the speech side of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub bundle: SessionBundle,
    pub vad: Arc<VadSettings>,
}

impl SessionConfig {
    /// Whether this session runs on a speech-to-speech model.
    pub fn is_realtime(&self) -> bool {
        matches!(self.bundle, SessionBundle::Realtime(_))
    }
}

fn fallback_bundle(agent: &Agent) -> SessionBundle {
    let voice = if agent.voice.trim().is_empty() {
        DEFAULT_VOICE.to_string()
    } else {
        agent.voice.clone()
    };
    SessionBundle::Realtime(RealtimeModel {
        provider: "openai",
        voice,
        api_key: agent.api_key.clone(),
    })
}

/// Map an agent to its session configuration.
pub fn build_session(agent: &Agent, vad: Arc<VadSettings>) -> SessionConfig {
    let bundle = match &agent.agent_type {
        AgentType::Realtime => SessionBundle::Realtime(RealtimeModel {
            provider: "openai",
            voice: agent.voice.clone(),
            api_key: agent.api_key.clone(),
        }),
        AgentType::Custom => SessionBundle::Pipeline(PipelineModels::default()),
        AgentType::Fallback => {
            info!("Agent {} uses the fallback bundle", agent.id);
            fallback_bundle(agent)
        }
        AgentType::Other(tag) => {
            warn!(
                "Unknown agent type '{}' for agent {}; using fallback bundle",
                tag, agent.id
            );
            fallback_bundle(agent)
        }
    };

    SessionConfig { bundle, vad }
}
