//! Calendar provider: conflict lookup and event insertion.
//!
//! [`GoogleCalendar`] talks to the Google Calendar v3 REST API with a
//! service-account key, using the OAuth2 JWT-bearer grant (RS256). Access
//! tokens are cached until shortly before they expire.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::CalendarConfig;
use crate::error::CalendarError;

/// Length of a booked appointment.
pub const APPOINTMENT_MINUTES: i64 = 30;

const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN_SECS: u64 = 60;

/// An event already on the calendar.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Browser link to the event.
    #[serde(default)]
    pub html_link: Option<String>,
}

/// An event to create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl NewEvent {
    /// A standard appointment slot for `name` starting at `start`.
    pub fn appointment(name: &str, phone_number: &str, start: DateTime<Utc>) -> Self {
        Self {
            summary: format!("Appointment: {}", name),
            description: format!("Booked via Voice Assistant. Phone: {}", phone_number),
            start,
            end: start + Duration::minutes(APPOINTMENT_MINUTES),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: String,
    time_zone: &'static str,
}

impl EventTime {
    fn utc(at: DateTime<Utc>) -> Self {
        Self {
            date_time: at.to_rfc3339_opts(SecondsFormat::Secs, true),
            time_zone: "UTC",
        }
    }
}

#[derive(Serialize)]
struct EventBody<'a> {
    summary: &'a str,
    description: &'a str,
    start: EventTime,
    end: EventTime,
}

impl<'a> From<&'a NewEvent> for EventBody<'a> {
    fn from(event: &'a NewEvent) -> Self {
        Self {
            summary: &event.summary,
            description: &event.description,
            start: EventTime::utc(event.start),
            end: EventTime::utc(event.end),
        }
    }
}

#[derive(Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

/// Read and write access to the appointment calendar.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Events overlapping `[start, end)`, recurring events expanded.
    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;

    /// Create an event and return it as stored.
    async fn insert_event(&self, event: &NewEvent) -> Result<CalendarEvent, CalendarError>;
}

/// Service-account key file contents.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parse a key from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, CalendarError> {
        serde_json::from_str(json).map_err(|e| CalendarError::Credentials(e.to_string()))
    }

    /// Load a key file.
    pub fn from_file(path: &Path) -> Result<Self, CalendarError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| CalendarError::Credentials(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Override the token endpoint.
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Serialize)]
struct GrantClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Google Calendar client authenticated as a service account.
pub struct GoogleCalendar {
    http: Client,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    calendar_id: String,
    api_base: String,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleCalendar {
    /// Create a client for `calendar_id`. Fails if the private key is not
    /// a valid RSA PEM.
    pub fn new(key: ServiceAccountKey, calendar_id: impl Into<String>) -> Result<Self, CalendarError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| CalendarError::Credentials(format!("private_key: {}", e)))?;

        Ok(Self {
            http: Client::new(),
            key,
            signing_key,
            calendar_id: calendar_id.into(),
            api_base: GOOGLE_CALENDAR_API.to_string(),
            token: Mutex::new(None),
        })
    }

    /// Create a client from the configured key file.
    pub fn from_config(config: &CalendarConfig) -> Result<Self, CalendarError> {
        let path = config.credentials_path.as_deref().ok_or_else(|| {
            CalendarError::Configuration("GOOGLE_APPLICATION_CREDENTIALS is not set".to_string())
        })?;
        let key = ServiceAccountKey::from_file(path)?;
        Self::new(key, config.calendar_id.clone())
    }

    /// Point the client at a different API root.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(&self.calendar_id)
        )
    }

    async fn access_token(&self) -> Result<String, CalendarError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.request_token().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    async fn request_token(&self) -> Result<CachedToken, CalendarError> {
        let now = Utc::now().timestamp();
        let claims = GrantClaims {
            iss: &self.key.client_email,
            scope: CALENDAR_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let header = Header {
            kid: self.key.private_key_id.clone(),
            ..Header::new(Algorithm::RS256)
        };
        let assertion = jsonwebtoken::encode(&header, &claims, &self.signing_key)?;

        debug!("Requesting calendar access token from {}", self.key.token_uri);
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = token
            .expires_in
            .unwrap_or(ASSERTION_LIFETIME_SECS as u64)
            .saturating_sub(TOKEN_REFRESH_MARGIN_SECS);

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + StdDuration::from_secs(lifetime),
        })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, CalendarError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(CalendarError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendar {
    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let token = self.access_token().await?;
        let time_min = start.to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = end.to_rfc3339_opts(SecondsFormat::Secs, true);

        let response = self
            .http
            .get(self.events_url())
            .bearer_auth(token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
            ])
            .send()
            .await?;

        let list: EventList = Self::check(response).await?.json().await?;
        debug!(
            "Calendar {} has {} events between {} and {}",
            self.calendar_id,
            list.items.len(),
            time_min,
            time_max
        );
        Ok(list.items)
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<CalendarEvent, CalendarError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(self.events_url())
            .bearer_auth(token)
            .json(&EventBody::from(event))
            .send()
            .await?;

        let created: CalendarEvent = Self::check(response).await?.json().await?;
        info!(
            "Created calendar event {} on {}",
            created.id.as_deref().unwrap_or("?"),
            self.calendar_id
        );
        Ok(created)
    }
}

impl std::fmt::Debug for GoogleCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCalendar")
            .field("calendar_id", &self.calendar_id)
            .field("api_base", &self.api_base)
            .field("key", &self.key)
            .finish()
    }
}

/// Build the calendar provider for a process, if one is configured.
///
/// Returns None (and logs why) when no key file is set or it cannot be
/// loaded; calendar tools then report the service as unavailable.
pub fn calendar_from_config(config: &CalendarConfig) -> Option<Arc<dyn CalendarProvider>> {
    match GoogleCalendar::from_config(config) {
        Ok(calendar) => {
            info!("Calendar integration enabled for {}", config.calendar_id);
            Some(Arc::new(calendar))
        }
        Err(CalendarError::Configuration(reason)) => {
            warn!("{}; calendar integration disabled", reason);
            None
        }
        Err(e) => {
            error!("Failed to initialize calendar: {}", e);
            None
        }
    }
}
