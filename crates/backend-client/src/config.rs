//! Configuration types for backend-client.

use std::env;
use std::fmt;
use std::time::Duration;

/// Default backend URL when `API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for connecting to the backend service.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL of the backend (e.g., "http://127.0.0.1:8000").
    pub base_url: String,
    /// Shared secret sent as a bearer token.
    /// If None, backend-dependent features are disabled.
    pub secret: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl BackendConfig {
    /// Create a new configuration with the given base URL and no secret.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            secret: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// - `API_URL` - Backend URL (default: http://127.0.0.1:8000)
    /// - `API_SECRET_KEY` - Shared secret (optional)
    pub fn from_env() -> Self {
        let base_url = env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let secret = env::var("API_SECRET_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            secret,
            ..Self::new(base_url)
        }
    }

    /// Set the shared secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a shared secret is configured.
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Get the agent lookup URL. The id is percent-encoded as one path segment.
    pub fn agent_url(&self, agent_id: &str) -> String {
        format!("{}/agents/get/{}", self.base_url, urlencoding::encode(agent_id))
    }

    /// Get the tool-set lookup URL. The id is percent-encoded as one path segment.
    pub fn tool_url(&self, tool_id: &str) -> String {
        format!("{}/tools/get/{}", self.base_url, urlencoding::encode(tool_id))
    }

    /// Get the server time URL used by the business-hours check.
    pub fn org_time_url(&self) -> String {
        format!("{}/agent/is-org-open/time", self.base_url)
    }

    /// Get the business-hours check URL.
    pub fn org_check_url(&self) -> String {
        format!("{}/agent/is-org-open/check", self.base_url)
    }

    /// Get the history creation URL.
    pub fn history_url(&self) -> String {
        format!("{}/history/create", self.base_url)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}
