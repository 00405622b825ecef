//! Per-call orchestration.
//!
//! One [`Orchestrator`] is built per worker process and shared by every
//! job. [`Orchestrator::handle_call`] walks a call through
//! `Idle -> Connected -> ParticipantJoined -> AgentResolved ->
//! SessionRunning -> Ended`. Only a missing agent ends the call early;
//! every other backend or provider failure degrades the call instead.

use std::sync::Arc;
use std::time::Instant;

use backend_client::{Agent, BackendApi, BackendClient, HistoryRecord};
use call_tools::{
    calendar_from_config, resolve_call_tools, CallContext, LiveKitTransfer, ToolDeps,
};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::error::OrchestratorError;
use crate::report::conversation_from_report;
use crate::runtime::{
    agent_id_from_metadata, Greeting, JobContext, NoiseCancellation, Participant, SessionRequest,
    SessionRunner,
};
use crate::session::{build_session, VadSettings};
use crate::settings::Settings;

/// Where a call is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Connected,
    ParticipantJoined,
    AgentResolved,
    SessionRunning,
    Ended,
}

/// What happened to a call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub state: CallState,
    /// Every state the call passed through, in order.
    pub path: Vec<CallState>,
    pub session_started: bool,
    /// The record sent to the backend, if a session ran.
    pub history: Option<HistoryRecord>,
}

struct CallTracker {
    room: String,
    path: Vec<CallState>,
}

impl CallTracker {
    fn new(room: &str) -> Self {
        Self {
            room: room.to_string(),
            path: vec![CallState::Idle],
        }
    }

    fn state(&self) -> CallState {
        self.path.last().copied().unwrap_or(CallState::Idle)
    }

    fn advance(&mut self, next: CallState) {
        debug!("Call in {}: {:?} -> {:?}", self.room, self.state(), next);
        self.path.push(next);
    }

    fn finish(mut self, history: Option<HistoryRecord>) -> CallOutcome {
        let session_started = self.path.contains(&CallState::SessionRunning);
        self.advance(CallState::Ended);
        CallOutcome {
            state: CallState::Ended,
            path: self.path,
            session_started,
            history,
        }
    }
}

/// Drives calls from job assignment to history persistence.
pub struct Orchestrator {
    backend: Arc<dyn BackendApi>,
    tools: ToolDeps,
    vad: Arc<VadSettings>,
}

impl Orchestrator {
    /// Create an orchestrator from already-built providers.
    pub fn new(tools: ToolDeps, vad: Arc<VadSettings>) -> Self {
        Self {
            backend: tools.backend.clone(),
            tools,
            vad,
        }
    }

    /// Build the real providers from process settings.
    pub fn from_settings(settings: &Settings, vad: Arc<VadSettings>) -> Result<Self, OrchestratorError> {
        if !settings.backend.has_secret() {
            warn!("API_SECRET_KEY is not set; agent lookup and call history are disabled");
        }
        if !settings.livekit.is_configured() {
            warn!("LiveKit server credentials are not set; call forwarding will fail");
        }

        let backend: Arc<dyn BackendApi> = Arc::new(BackendClient::new(settings.backend.clone())?);
        let tools = ToolDeps {
            backend,
            calendar: calendar_from_config(&settings.calendar),
            transfer: Arc::new(LiveKitTransfer::new(settings.livekit.clone())),
            transfer_config: settings.transfer.clone(),
        };
        Ok(Self::new(tools, vad))
    }

    /// Handle one dispatched job until the call ends.
    ///
    /// Runtime failures before the session starts (connect, participant
    /// wait) are returned as errors. An unknown agent ends the call without
    /// a session. A failed session still produces a history record.
    pub async fn handle_call<J, R>(&self, job: &J, runner: &R) -> Result<CallOutcome, OrchestratorError>
    where
        J: JobContext + ?Sized,
        R: SessionRunner + ?Sized,
    {
        let mut call = CallTracker::new(job.room_name());
        info!("Starting call in room {}", job.room_name());
        debug!("Job metadata: {:?}", job.job_metadata());

        job.connect().await?;
        call.advance(CallState::Connected);

        let participant = job.wait_for_participant().await?;
        call.advance(CallState::ParticipantJoined);
        info!(
            "Participant {} joined ({:?}, sip: {})",
            participant.identity,
            participant.kind,
            participant.is_sip()
        );

        let Some(agent) = self.resolve_agent(job, &participant).await else {
            return Ok(call.finish(None));
        };
        call.advance(CallState::AgentResolved);

        let request = self.session_request(job, &participant, &agent).await;
        let started_at = Utc::now();
        let clock = Instant::now();
        call.advance(CallState::SessionRunning);

        let conversation = match runner.run_session(request).await {
            Ok(report) => conversation_from_report(&report),
            Err(e) => {
                error!("Session for agent {} failed: {}", agent.id, e);
                Vec::new()
            }
        };

        let record = HistoryRecord::new(agent.id.clone(), started_at, clock.elapsed(), conversation);
        info!(
            "Call with agent {} ended after {}s ({} turns)",
            agent.id,
            record.duration,
            record.turn_count()
        );
        self.backend.persist_history(&record).await;

        Ok(call.finish(Some(record)))
    }

    /// Agent id from the participant, else from job metadata; then fetch it.
    async fn resolve_agent<J: JobContext + ?Sized>(
        &self,
        job: &J,
        participant: &Participant,
    ) -> Option<Agent> {
        let agent_id = participant
            .agent_id()
            .map(str::to_string)
            .or_else(|| job.job_metadata().and_then(agent_id_from_metadata));

        let Some(agent_id) = agent_id else {
            error!(
                "No agent_id on participant {} or in job metadata",
                participant.identity
            );
            return None;
        };

        match self.backend.fetch_agent(&agent_id).await {
            Ok(agent) => {
                info!("Resolved agent {} ({})", agent.id, agent.name);
                Some(agent)
            }
            Err(e) => {
                error!("Agent {} not found: {}", agent_id, e);
                None
            }
        }
    }

    async fn session_request<J: JobContext + ?Sized>(
        &self,
        job: &J,
        participant: &Participant,
        agent: &Agent,
    ) -> SessionRequest {
        let mut tools = resolve_call_tools(agent, &self.tools).await;
        tools.set_context(
            CallContext::new(job.room_name(), participant.identity.clone())
                .with_phone_number(participant.phone_number())
                .with_user_id(agent.user_id.clone()),
        );

        SessionRequest {
            room_name: job.room_name().to_string(),
            participant_identity: participant.identity.clone(),
            instructions: agent.system_prompt.clone(),
            greeting: Greeting::say(&agent.greeting_prompt),
            config: build_session(agent, self.vad.clone()),
            tools,
            noise_cancellation: NoiseCancellation::for_participant(participant),
        }
    }
}
