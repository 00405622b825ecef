//! Backend HTTP client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::types::{Agent, HistoryRecord, ToolDescriptor};

/// Response from the server time endpoint.
#[derive(Debug, Deserialize)]
struct ServerTimeResponse {
    #[serde(default)]
    current_time: Option<String>,
}

/// Operations the voice agent needs from the backend.
///
/// Abstracted so tool handlers and the orchestrator can run against fakes.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Fetch an agent by id.
    async fn fetch_agent(&self, agent_id: &str) -> Result<Agent, BackendError>;

    /// Fetch a tool-set descriptor by id.
    async fn fetch_tool_descriptor(&self, tool_id: &str) -> Result<ToolDescriptor, BackendError>;

    /// Get the backend's current time, as the string the check endpoint expects.
    async fn server_time(&self) -> Result<String, BackendError>;

    /// Ask whether the organization owned by `user_id` is open at `target_time`.
    async fn is_org_open(
        &self,
        user_id: Option<&str>,
        target_time: &str,
    ) -> Result<bool, BackendError>;

    /// Persist a finished call. Best-effort: failures are logged, never returned.
    async fn persist_history(&self, record: &HistoryRecord);
}

/// Client for the backend HTTP API.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    config: BackendConfig,
}

impl BackendClient {
    /// Create a new client. No request is made until an operation is called.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(BackendError::Http)?;

        Ok(Self { http, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// The shared secret, or a configuration error if none is set.
    fn secret(&self) -> Result<&str, BackendError> {
        self.config
            .secret
            .as_deref()
            .ok_or_else(|| BackendError::Configuration("API_SECRET_KEY is not set".to_string()))
    }

    fn authorized(&self, builder: RequestBuilder, secret: &str) -> RequestBuilder {
        builder
            .bearer_auth(secret)
            .header("Content-Type", "application/json")
    }

    /// GET a JSON document. A 404 maps to `NotFound` for `entity`/`id`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        entity: &'static str,
        id: &str,
    ) -> Result<T, BackendError> {
        let secret = self.secret()?;
        debug!("GET {}", url);

        let request = self.authorized(self.http.get(url), secret);
        let request = if query.is_empty() {
            request
        } else {
            request.query(query)
        };
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound {
                entity,
                id: id.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }

    async fn post_history(&self, secret: &str, record: &HistoryRecord) -> Result<(), BackendError> {
        let url = self.config.history_url();
        debug!("POST {}", url);

        let response = self
            .authorized(self.http.post(&url), secret)
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Interpret the business-hours check payload.
///
/// The endpoint answers with a bare boolean; an object with an `is_open` or
/// `open` flag is accepted as well.
fn interpret_open_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(open) => Some(*open),
        Value::Object(map) => map
            .get("is_open")
            .or_else(|| map.get("open"))
            .and_then(Value::as_bool),
        _ => None,
    }
}

#[async_trait]
impl BackendApi for BackendClient {
    async fn fetch_agent(&self, agent_id: &str) -> Result<Agent, BackendError> {
        let url = self.config.agent_url(agent_id);
        let mut agent: Agent = self.get_json(&url, &[], "agent", agent_id).await?;
        if agent.id.is_empty() {
            agent.id = agent_id.to_string();
        }
        info!(
            "Fetched agent {} ({}, type: {})",
            agent.id, agent.name, agent.agent_type
        );
        Ok(agent)
    }

    async fn fetch_tool_descriptor(&self, tool_id: &str) -> Result<ToolDescriptor, BackendError> {
        let url = self.config.tool_url(tool_id);
        let mut descriptor: ToolDescriptor = self.get_json(&url, &[], "tool", tool_id).await?;
        if descriptor.id.is_empty() {
            descriptor.id = tool_id.to_string();
        }
        debug!(
            "Fetched tool descriptor {} (appointment: {}, default: {})",
            descriptor.id, descriptor.has_appointment_tools, descriptor.has_default_tools
        );
        Ok(descriptor)
    }

    async fn server_time(&self) -> Result<String, BackendError> {
        let url = self.config.org_time_url();
        let response: ServerTimeResponse = self.get_json(&url, &[], "server time", "").await?;
        response
            .current_time
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                BackendError::UnexpectedResponse("Unable to determine current server time.".to_string())
            })
    }

    async fn is_org_open(
        &self,
        user_id: Option<&str>,
        target_time: &str,
    ) -> Result<bool, BackendError> {
        let url = self.config.org_check_url();
        let user_id = user_id.unwrap_or_default();
        let value: Value = self
            .get_json(
                &url,
                &[("user_id", user_id), ("target_time", target_time)],
                "organization",
                user_id,
            )
            .await?;

        interpret_open_flag(&value).ok_or_else(|| {
            BackendError::UnexpectedResponse(format!("unexpected business-hours payload: {}", value))
        })
    }

    async fn persist_history(&self, record: &HistoryRecord) {
        let secret = match self.secret() {
            Ok(secret) => secret,
            Err(_) => {
                warn!(
                    "API_SECRET_KEY is not set; skipping history for agent {}",
                    record.agent_id
                );
                return;
            }
        };

        match self.post_history(secret, record).await {
            Ok(()) => info!(
                "Saved call history for agent {} ({}s, {} entries)",
                record.agent_id,
                record.duration,
                record.conversation.len()
            ),
            Err(BackendError::Remote { status, body }) => {
                error!("Failed to save call history: HTTP {}: {}", status, body)
            }
            Err(e) => error!("Failed to save call history: {}", e),
        }
    }
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("config", &self.config)
            .finish()
    }
}
