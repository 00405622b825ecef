//! End-to-end call handling with fake runtime and providers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use backend_client::{
    Agent, AgentType, BackendApi, BackendConfig, BackendError, HistoryEntry, HistoryRecord, ToolDescriptor,
    ToolExecution,
};
use call_tools::{CallTransfer, TelephonyError, ToolDeps, TransferConfig, TransferRequest};
use serde_json::{json, Value};
use voice_orchestrator::{
    async_trait, prewarm, CallState, ConversationItem, JobContext, NoiseCancellation,
    Orchestrator, OrchestratorError, Participant, ParticipantKind, SessionEvent, SessionReport,
    SessionRequest, SessionRunner, Settings,
};

const ROOM: &str = "call-_+15551234567_abc";

#[derive(Default)]
struct FakeBackend {
    agents: HashMap<String, Agent>,
    descriptors: HashMap<String, ToolDescriptor>,
    fetched: Mutex<Vec<String>>,
    histories: Mutex<Vec<HistoryRecord>>,
}

impl FakeBackend {
    fn with_agent(agent: Agent) -> Self {
        let mut backend = FakeBackend::default();
        backend.agents.insert(agent.id.clone(), agent);
        backend
    }

    fn with_descriptor(mut self, descriptor: ToolDescriptor) -> Self {
        self.descriptors.insert(descriptor.id.clone(), descriptor);
        self
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn fetch_agent(&self, agent_id: &str) -> Result<Agent, BackendError> {
        self.fetched.lock().unwrap().push(agent_id.to_string());
        self.agents
            .get(agent_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound {
                entity: "agent",
                id: agent_id.to_string(),
            })
    }

    async fn fetch_tool_descriptor(&self, tool_id: &str) -> Result<ToolDescriptor, BackendError> {
        self.descriptors
            .get(tool_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound {
                entity: "tool",
                id: tool_id.to_string(),
            })
    }

    async fn server_time(&self) -> Result<String, BackendError> {
        Ok("2024-02-05T10:15:00".to_string())
    }

    async fn is_org_open(&self, _user_id: Option<&str>, _target_time: &str) -> Result<bool, BackendError> {
        Ok(true)
    }

    async fn persist_history(&self, record: &HistoryRecord) {
        self.histories.lock().unwrap().push(record.clone());
    }
}

#[derive(Default)]
struct FakeTransfer {
    requests: Mutex<Vec<TransferRequest>>,
}

#[async_trait]
impl CallTransfer for FakeTransfer {
    async fn transfer(&self, request: &TransferRequest) -> Result<(), TelephonyError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

struct FakeJob {
    room: String,
    metadata: Option<String>,
    participant: Participant,
    fail_connect: bool,
}

impl FakeJob {
    fn new(participant: Participant) -> Self {
        Self {
            room: ROOM.to_string(),
            metadata: None,
            participant,
            fail_connect: false,
        }
    }

    fn with_metadata(mut self, metadata: &str) -> Self {
        self.metadata = Some(metadata.to_string());
        self
    }
}

#[async_trait]
impl JobContext for FakeJob {
    fn room_name(&self) -> &str {
        &self.room
    }

    fn job_metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    async fn connect(&self) -> Result<(), OrchestratorError> {
        if self.fail_connect {
            return Err(OrchestratorError::Runtime("room unreachable".to_string()));
        }
        Ok(())
    }

    async fn wait_for_participant(&self) -> Result<Participant, OrchestratorError> {
        Ok(self.participant.clone())
    }
}

/// What the runner saw of a session request.
#[derive(Debug, Clone)]
struct SeenSession {
    instructions: String,
    greeting: String,
    allow_interruptions: bool,
    realtime: bool,
    tools: Vec<String>,
    phone_number: String,
    noise_cancellation: NoiseCancellation,
}

/// Plays a short scripted conversation; forwards the call when it can.
#[derive(Default)]
struct ScriptedRunner {
    fail: bool,
    sessions: Mutex<Vec<SeenSession>>,
}

#[async_trait]
impl SessionRunner for ScriptedRunner {
    async fn run_session(&self, request: SessionRequest) -> Result<SessionReport, OrchestratorError> {
        self.sessions.lock().unwrap().push(SeenSession {
            instructions: request.instructions.clone(),
            greeting: request.greeting.instructions.clone(),
            allow_interruptions: request.greeting.allow_interruptions,
            realtime: request.config.is_realtime(),
            tools: request
                .tools
                .list_tools()
                .into_iter()
                .map(str::to_string)
                .collect(),
            phone_number: request.tools.context().phone_number.clone(),
            noise_cancellation: request.noise_cancellation,
        });

        if self.fail {
            return Err(OrchestratorError::Runtime("media track lost".to_string()));
        }

        let mut events = vec![
            SessionEvent::ConversationItemAdded {
                item: ConversationItem::new("assistant", "Thanks for calling the clinic."),
            },
            SessionEvent::Other,
            SessionEvent::ConversationItemAdded {
                item: ConversationItem::new("user", "Can I talk to a person?"),
            },
        ];

        if request.tools.has_tool("call_forward") {
            let output = request
                .tools
                .execute_json("call_forward", "")
                .await
                .map_err(|e| OrchestratorError::Runtime(e.to_string()))?;
            events.push(SessionEvent::FunctionToolsExecuted {
                calls: vec![ToolExecution {
                    name: "call_forward".to_string(),
                    arguments: json!({}),
                    output: output.content,
                    is_error: !output.success,
                }],
            });
        }

        Ok(SessionReport { events })
    }
}

fn clinic_agent() -> Agent {
    Agent::new("agent-42")
        .with_prompts("You are the clinic receptionist.", "Hello, thanks for calling!")
        .with_user_id("41")
        .with_tool_id("tools-7")
}

fn sip_caller() -> Participant {
    Participant::new("sip_+15551234567", ParticipantKind::Sip)
        .with_attribute("sip.phoneNumber", "+15551234567")
        .with_attribute("agent_id", "agent-42")
}

fn orchestrator(backend: Arc<FakeBackend>, transfer: Arc<FakeTransfer>) -> Orchestrator {
    let deps = ToolDeps {
        backend,
        calendar: None,
        transfer,
        transfer_config: TransferConfig::default(),
    };
    Orchestrator::new(deps, prewarm())
}

#[tokio::test]
async fn test_sip_call_runs_session_and_saves_history() {
    let backend = Arc::new(
        FakeBackend::with_agent(clinic_agent())
            .with_descriptor(ToolDescriptor::new("tools-7", "clinic").with_appointment_tools()),
    );
    let transfer = Arc::new(FakeTransfer::default());
    let runner = ScriptedRunner::default();

    let outcome = orchestrator(backend.clone(), transfer.clone())
        .handle_call(&FakeJob::new(sip_caller()), &runner)
        .await
        .unwrap();

    assert_eq!(outcome.state, CallState::Ended);
    assert!(outcome.session_started);
    assert_eq!(
        outcome.path,
        vec![
            CallState::Idle,
            CallState::Connected,
            CallState::ParticipantJoined,
            CallState::AgentResolved,
            CallState::SessionRunning,
            CallState::Ended,
        ]
    );

    let sessions = runner.sessions.lock().unwrap();
    let seen = &sessions[0];
    assert_eq!(seen.instructions, "You are the clinic receptionist.");
    assert_eq!(seen.greeting, "Say: Hello, thanks for calling!");
    assert!(!seen.allow_interruptions);
    assert!(seen.realtime);
    assert_eq!(
        seen.tools,
        vec!["book_appointment", "call_forward", "check_availability"]
    );
    assert_eq!(seen.phone_number, "+15551234567");
    assert_eq!(seen.noise_cancellation, NoiseCancellation::Telephony);

    // call_forward ran with the call's own room and caller
    let transfers = transfer.requests.lock().unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].room_name, ROOM);
    assert_eq!(transfers[0].participant_identity, "sip_+15551234567");

    let record = outcome.history.unwrap();
    assert_eq!(record.agent_id, "agent-42");
    assert_eq!(record.turn_count(), 2);
    assert_eq!(
        record.conversation[0],
        HistoryEntry::message("assistant", "Thanks for calling the clinic.")
    );
    match &record.conversation[2] {
        HistoryEntry::FunctionToolsExecuted { calls } => {
            assert_eq!(calls[0].output, "Transferring your call now.")
        }
        other => panic!("Expected tool batch, got {:?}", other),
    }
    assert_eq!(*backend.histories.lock().unwrap(), vec![record]);
}

#[tokio::test]
async fn test_web_participant_gets_standard_profile() {
    let agent = Agent::new("agent-7").with_type(AgentType::Custom);
    let backend = Arc::new(FakeBackend::with_agent(agent));
    let runner = ScriptedRunner::default();
    let participant = Participant::new("web-user", ParticipantKind::Standard)
        .with_attribute("agent_id", "agent-7");

    let outcome = orchestrator(backend, Arc::new(FakeTransfer::default()))
        .handle_call(&FakeJob::new(participant), &runner)
        .await
        .unwrap();

    assert!(outcome.session_started);
    let sessions = runner.sessions.lock().unwrap();
    assert_eq!(sessions[0].phone_number, "Unknown");
    assert_eq!(sessions[0].noise_cancellation, NoiseCancellation::Standard);
    assert!(!sessions[0].realtime);
    assert!(sessions[0].tools.is_empty());
}

#[tokio::test]
async fn test_agent_id_from_job_metadata() {
    let backend = Arc::new(FakeBackend::with_agent(Agent::new("manual-dispatch")));
    let runner = ScriptedRunner::default();
    let participant = Participant::new("web-user", ParticipantKind::Standard);
    let job = FakeJob::new(participant).with_metadata(r#"{"agent_id": "manual-dispatch"}"#);

    let outcome = orchestrator(backend.clone(), Arc::new(FakeTransfer::default()))
        .handle_call(&job, &runner)
        .await
        .unwrap();

    assert!(outcome.session_started);
    assert_eq!(*backend.fetched.lock().unwrap(), vec!["manual-dispatch"]);
}

#[tokio::test]
async fn test_participant_attribute_wins_over_metadata() {
    let backend = Arc::new(FakeBackend::with_agent(clinic_agent()));
    let job = FakeJob::new(sip_caller()).with_metadata("some-other-agent");

    orchestrator(backend.clone(), Arc::new(FakeTransfer::default()))
        .handle_call(&job, &ScriptedRunner::default())
        .await
        .unwrap();

    assert_eq!(*backend.fetched.lock().unwrap(), vec!["agent-42"]);
}

#[tokio::test]
async fn test_unknown_agent_ends_without_session() {
    let backend = Arc::new(FakeBackend::default());
    let runner = ScriptedRunner::default();

    let outcome = orchestrator(backend.clone(), Arc::new(FakeTransfer::default()))
        .handle_call(&FakeJob::new(sip_caller()), &runner)
        .await
        .unwrap();

    assert_eq!(outcome.state, CallState::Ended);
    assert!(!outcome.session_started);
    assert!(outcome.history.is_none());
    assert!(!outcome.path.contains(&CallState::AgentResolved));
    assert!(runner.sessions.lock().unwrap().is_empty());
    assert!(backend.histories.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_agent_id_ends_without_lookup() {
    let backend = Arc::new(FakeBackend::with_agent(clinic_agent()));
    let participant = Participant::new("web-user", ParticipantKind::Standard);

    let outcome = orchestrator(backend.clone(), Arc::new(FakeTransfer::default()))
        .handle_call(&FakeJob::new(participant), &ScriptedRunner::default())
        .await
        .unwrap();

    assert!(!outcome.session_started);
    assert!(backend.fetched.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_session_still_saves_history() {
    let backend = Arc::new(FakeBackend::with_agent(clinic_agent()));
    let runner = ScriptedRunner {
        fail: true,
        ..Default::default()
    };

    let outcome = orchestrator(backend.clone(), Arc::new(FakeTransfer::default()))
        .handle_call(&FakeJob::new(sip_caller()), &runner)
        .await
        .unwrap();

    assert!(outcome.session_started);
    let record = outcome.history.unwrap();
    assert!(record.conversation.is_empty());
    assert_eq!(backend.histories.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_connect_failure_is_an_error() {
    let backend = Arc::new(FakeBackend::with_agent(clinic_agent()));
    let mut job = FakeJob::new(sip_caller());
    job.fail_connect = true;

    let result = orchestrator(backend.clone(), Arc::new(FakeTransfer::default()))
        .handle_call(&job, &ScriptedRunner::default())
        .await;

    assert!(matches!(result, Err(OrchestratorError::Runtime(_))));
    assert!(backend.fetched.lock().unwrap().is_empty());
}

mod settings_tests {
    use super::*;

    const SECRET: &str = "worker-secret";

    #[derive(Clone, Default)]
    struct HttpBackend {
        histories: Arc<Mutex<Vec<Value>>>,
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get("authorization").and_then(|v| v.to_str().ok())
            == Some(format!("Bearer {}", SECRET).as_str())
    }

    async fn spawn_backend(backend: HttpBackend) -> String {
        let histories = backend.histories.clone();
        let app = Router::new()
            .route(
                "/agents/get/:id",
                get(|Path(id): Path<String>, headers: HeaderMap| async move {
                    if !authorized(&headers) {
                        return Err(StatusCode::UNAUTHORIZED);
                    }
                    Ok(Json(json!({
                        "id": id,
                        "system_prompt": "You answer the front desk.",
                        "greeting_prompt": "Good morning!"
                    })))
                }),
            )
            .route(
                "/history/create",
                post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
                    if !authorized(&headers) {
                        return Err(StatusCode::UNAUTHORIZED);
                    }
                    histories.lock().unwrap().push(body);
                    Ok(Json(json!({"status": "ok"})))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_default_settings_end_call_without_session() {
        let orchestrator = Orchestrator::from_settings(&Settings::default(), prewarm()).unwrap();
        let runner = ScriptedRunner::default();

        let outcome = orchestrator
            .handle_call(&FakeJob::new(sip_caller()), &runner)
            .await
            .unwrap();

        assert_eq!(outcome.state, CallState::Ended);
        assert!(!outcome.session_started);
        assert!(outcome.history.is_none());
        assert_eq!(
            outcome.path,
            vec![
                CallState::Idle,
                CallState::Connected,
                CallState::ParticipantJoined,
                CallState::Ended,
            ]
        );
        assert!(runner.sessions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_configured_settings_run_session_against_backend() {
        let backend = HttpBackend::default();
        let base = spawn_backend(backend.clone()).await;
        let settings =
            Settings::default().with_backend(BackendConfig::new(base).with_secret(SECRET));
        let orchestrator = Orchestrator::from_settings(&settings, prewarm()).unwrap();
        let runner = ScriptedRunner::default();

        let outcome = orchestrator
            .handle_call(&FakeJob::new(sip_caller()), &runner)
            .await
            .unwrap();

        assert!(outcome.session_started);
        let sessions = runner.sessions.lock().unwrap();
        assert_eq!(sessions[0].instructions, "You answer the front desk.");
        assert!(sessions[0].tools.is_empty());

        let histories = backend.histories.lock().unwrap();
        assert_eq!(histories.len(), 1);
        assert_eq!(histories[0]["agent_id"], "agent-42");
    }
}
