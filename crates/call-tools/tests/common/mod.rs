//! Fakes for the provider traits.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use backend_client::{Agent, BackendApi, BackendError, HistoryRecord, ToolDescriptor};
use call_tools::{
    async_trait, CalendarError, CalendarEvent, CalendarProvider, CallTransfer, NewEvent,
    TelephonyError, ToolDeps, TransferConfig, TransferRequest,
};
use chrono::{DateTime, Utc};

pub const SERVER_TIME: &str = "2024-02-05T10:15:00";

/// Backend that serves one tool descriptor and a fixed business-hours answer.
#[derive(Default)]
pub struct FakeBackend {
    pub descriptor: Option<ToolDescriptor>,
    pub open: bool,
    /// Behave as if API_SECRET_KEY were unset.
    pub unconfigured: bool,
    /// Server time endpoint answers without a time.
    pub no_server_time: bool,
    /// Business-hours check answers with HTTP 503.
    pub check_fails: bool,
    pub descriptor_fetches: Mutex<Vec<String>>,
    pub checks: Mutex<Vec<(Option<String>, String)>>,
}

impl FakeBackend {
    pub fn with_descriptor(descriptor: ToolDescriptor) -> Self {
        Self {
            descriptor: Some(descriptor),
            ..Default::default()
        }
    }

    fn guard(&self) -> Result<(), BackendError> {
        if self.unconfigured {
            return Err(BackendError::Configuration(
                "API_SECRET_KEY is not set".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn fetch_agent(&self, agent_id: &str) -> Result<Agent, BackendError> {
        Err(BackendError::NotFound {
            entity: "agent",
            id: agent_id.to_string(),
        })
    }

    async fn fetch_tool_descriptor(&self, tool_id: &str) -> Result<ToolDescriptor, BackendError> {
        self.guard()?;
        self.descriptor_fetches
            .lock()
            .unwrap()
            .push(tool_id.to_string());
        self.descriptor.clone().ok_or_else(|| BackendError::NotFound {
            entity: "tool",
            id: tool_id.to_string(),
        })
    }

    async fn server_time(&self) -> Result<String, BackendError> {
        self.guard()?;
        if self.no_server_time {
            return Err(BackendError::UnexpectedResponse(
                "Unable to determine current server time.".to_string(),
            ));
        }
        Ok(SERVER_TIME.to_string())
    }

    async fn is_org_open(
        &self,
        user_id: Option<&str>,
        target_time: &str,
    ) -> Result<bool, BackendError> {
        self.guard()?;
        if self.check_fails {
            return Err(BackendError::Remote {
                status: 503,
                body: "maintenance".to_string(),
            });
        }
        self.checks
            .lock()
            .unwrap()
            .push((user_id.map(str::to_string), target_time.to_string()));
        Ok(self.open)
    }

    async fn persist_history(&self, _record: &HistoryRecord) {}
}

/// Calendar holding a fixed set of events.
#[derive(Default)]
pub struct FakeCalendar {
    pub events: Vec<CalendarEvent>,
    pub fail: bool,
    pub queries: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    pub inserted: Mutex<Vec<NewEvent>>,
}

impl FakeCalendar {
    pub fn with_conflict() -> Self {
        Self {
            events: vec![CalendarEvent {
                id: Some("evt-1".to_string()),
                summary: Some("Appointment: Someone Else".to_string()),
                html_link: None,
            }],
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl CalendarProvider for FakeCalendar {
    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        if self.fail {
            return Err(CalendarError::Api {
                status: 503,
                body: "backend error".to_string(),
            });
        }
        self.queries.lock().unwrap().push((start, end));
        Ok(self.events.clone())
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<CalendarEvent, CalendarError> {
        if self.fail {
            return Err(CalendarError::Api {
                status: 503,
                body: "backend error".to_string(),
            });
        }
        self.inserted.lock().unwrap().push(event.clone());
        Ok(CalendarEvent {
            id: Some("evt-new".to_string()),
            summary: Some(event.summary.clone()),
            html_link: Some("https://calendar.example.com/event?eid=evt-new".to_string()),
        })
    }
}

/// Records transfers; optionally fails them with a SIP error.
#[derive(Default)]
pub struct FakeTransfer {
    pub fail: bool,
    pub requests: Mutex<Vec<TransferRequest>>,
}

#[async_trait]
impl CallTransfer for FakeTransfer {
    async fn transfer(&self, request: &TransferRequest) -> Result<(), TelephonyError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(TelephonyError::Sip {
                status_code: "486".to_string(),
                status: "Busy Here".to_string(),
            });
        }
        Ok(())
    }
}

pub fn deps(
    backend: Arc<FakeBackend>,
    calendar: Option<Arc<FakeCalendar>>,
    transfer: Arc<FakeTransfer>,
) -> ToolDeps {
    ToolDeps {
        backend,
        calendar: calendar.map(|c| c as Arc<dyn CalendarProvider>),
        transfer,
        transfer_config: TransferConfig::default(),
    }
}
