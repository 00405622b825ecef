//! Per-call session orchestration for the voice agent worker.
//!
//! The voice runtime hands the worker one job per call. For each job the
//! [`Orchestrator`]:
//!
//! 1. Connects to the room and waits for the caller
//! 2. Looks up the agent (participant attribute, else job metadata)
//! 3. Resolves the agent's tools and builds the session configuration
//! 4. Runs the session through a [`SessionRunner`]
//! 5. Sends the call history to the backend
//!
//! # Architecture
//!
//! ```text
//!   Settings::from_env()          prewarm()
//!          │                          │
//!          └──────► Orchestrator ◄────┘
//!                       │
//!   JobContext ─► handle_call ─► SessionRunner
//!                       │              │
//!                       │        SessionReport
//!                       ▼              │
//!                 HistoryRecord ◄──────┘
//!                       │
//!                       ▼
//!            BackendApi::persist_history
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let settings = Settings::from_env();
//! let orchestrator = Orchestrator::from_settings(&settings, prewarm())?;
//!
//! // once per dispatched job
//! let outcome = orchestrator.handle_call(&job, &runner).await?;
//! ```

pub mod dispatch;
mod error;
mod orchestrator;
pub mod report;
pub mod runtime;
pub mod session;
mod settings;

pub use dispatch::{
    AgentDispatch, AgentDispatchClient, CreateDispatchRequest, DEFAULT_DISPATCH_AGENT,
    DEFAULT_DISPATCH_ROOM, MANUAL_DISPATCH_AGENT_ID,
};
pub use error::{DispatchError, OrchestratorError};
pub use orchestrator::{CallOutcome, CallState, Orchestrator};
pub use report::conversation_from_report;
pub use runtime::{
    agent_id_from_metadata, ConversationItem, Greeting, JobContext, NoiseCancellation,
    Participant, ParticipantKind, SessionEvent, SessionReport, SessionRequest, SessionRunner,
};
pub use session::{build_session, prewarm, SessionBundle, SessionConfig, VadSettings};
pub use settings::Settings;

// Re-export async_trait for implementors of the runtime traits
pub use async_trait::async_trait;
