//! Configuration for the calendar and telephony providers.

use std::env;
use std::fmt;
use std::path::PathBuf;

/// Calendar id used when `GOOGLE_CALENDAR_ID` is not set.
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// Number the caller is handed to by `call_forward` unless `TRANSFER_TO` is set.
pub const DEFAULT_TRANSFER_TO: &str = "tel:+12894898478";

/// Google Calendar settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarConfig {
    /// Path to a service-account key file. Calendar tools report the
    /// service as unavailable when this is None.
    pub credentials_path: Option<PathBuf>,
    /// Calendar to read and write.
    pub calendar_id: String,
}

impl CalendarConfig {
    /// Create a configuration for the given key file.
    pub fn new(credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: Some(credentials_path.into()),
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// - `GOOGLE_APPLICATION_CREDENTIALS` - Service-account key file (optional)
    /// - `GOOGLE_CALENDAR_ID` - Calendar id (default: primary)
    pub fn from_env() -> Self {
        let credentials_path = env::var("GOOGLE_APPLICATION_CREDENTIALS")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let calendar_id = env::var("GOOGLE_CALENDAR_ID")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string());

        Self {
            credentials_path,
            calendar_id,
        }
    }

    /// Set the calendar id.
    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            credentials_path: None,
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
        }
    }
}

/// LiveKit server API credentials, shared by SIP transfer and agent dispatch.
#[derive(Clone, Default)]
pub struct LiveKitConfig {
    /// Server URL (`wss://` or `https://`).
    pub url: String,
    pub api_key: String,
    pub api_secret: String,
}

impl LiveKitConfig {
    /// Create a configuration from explicit credentials.
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// - `LIVEKIT_URL` - Server URL
    /// - `LIVEKIT_API_KEY` - API key
    /// - `LIVEKIT_API_SECRET` - API secret
    ///
    /// Missing variables leave the corresponding field empty.
    pub fn from_env() -> Self {
        Self {
            url: env::var("LIVEKIT_URL").unwrap_or_default(),
            api_key: env::var("LIVEKIT_API_KEY").unwrap_or_default(),
            api_secret: env::var("LIVEKIT_API_SECRET").unwrap_or_default(),
        }
    }

    /// Whether URL, key and secret are all present.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
            && !self.api_key.trim().is_empty()
            && !self.api_secret.trim().is_empty()
    }

    /// The server URL with a websocket scheme mapped to its HTTP equivalent.
    pub fn http_url(&self) -> String {
        let url = self.url.trim().trim_end_matches('/');
        if let Some(rest) = url.strip_prefix("wss://") {
            format!("https://{}", rest)
        } else if let Some(rest) = url.strip_prefix("ws://") {
            format!("http://{}", rest)
        } else {
            url.to_string()
        }
    }

    /// URL of a Twirp method on the server API.
    pub fn twirp_url(&self, service: &str, method: &str) -> String {
        format!("{}/twirp/{}/{}", self.http_url(), service, method)
    }
}

impl fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Where `call_forward` sends the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    /// SIP URI or `tel:` number.
    pub destination: String,
    /// Play a dial tone to the caller while the transfer connects.
    pub play_dialtone: bool,
}

impl TransferConfig {
    /// Create configuration from environment variables.
    ///
    /// - `TRANSFER_TO` - Destination (default: tel:+12894898478)
    /// - `TRANSFER_PLAY_DIALTONE` - "true"/"1" to play a dial tone (default: false)
    pub fn from_env() -> Self {
        let destination = env::var("TRANSFER_TO")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TRANSFER_TO.to_string());
        let play_dialtone = env::var("TRANSFER_PLAY_DIALTONE")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            destination,
            play_dialtone,
        }
    }

    /// Set the destination.
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            destination: DEFAULT_TRANSFER_TO.to_string(),
            play_dialtone: false,
        }
    }
}
