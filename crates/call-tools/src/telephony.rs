//! Telephony control: handing a SIP caller off to another number.

use std::time::Duration;

use async_trait::async_trait;
use livekit_api::access_token::{AccessToken, SIPGrants, VideoGrants};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::LiveKitConfig;
use crate::error::TelephonyError;

const SIP_SERVICE: &str = "livekit.SIP";
const TOKEN_TTL: Duration = Duration::from_secs(600);

/// A request to move a SIP participant to another destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRequest {
    pub participant_identity: String,
    pub room_name: String,
    /// `tel:` number or SIP URI.
    pub transfer_to: String,
    pub play_dialtone: bool,
}

/// Performs SIP call transfers.
#[async_trait]
pub trait CallTransfer: Send + Sync {
    async fn transfer(&self, request: &TransferRequest) -> Result<(), TelephonyError>;
}

#[derive(Debug, Default, Deserialize)]
struct TwirpError {
    #[serde(default)]
    msg: String,
    #[serde(default)]
    meta: std::collections::HashMap<String, String>,
}

/// Transfers calls through the LiveKit SIP service.
#[derive(Clone)]
pub struct LiveKitTransfer {
    http: Client,
    config: LiveKitConfig,
}

impl LiveKitTransfer {
    pub fn new(config: LiveKitConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Token allowed to administer `room_name` and place SIP calls.
    fn token(&self, room_name: &str) -> Result<String, TelephonyError> {
        let token = AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_grants(VideoGrants {
                room_admin: true,
                room: room_name.to_string(),
                ..Default::default()
            })
            .with_sip_grants(SIPGrants {
                call: true,
                ..Default::default()
            })
            .with_ttl(TOKEN_TTL);

        Ok(token.to_jwt()?)
    }
}

#[async_trait]
impl CallTransfer for LiveKitTransfer {
    async fn transfer(&self, request: &TransferRequest) -> Result<(), TelephonyError> {
        if !self.config.is_configured() {
            return Err(TelephonyError::Configuration(
                "LIVEKIT_URL, LIVEKIT_API_KEY and LIVEKIT_API_SECRET must be set".to_string(),
            ));
        }

        let url = self.config.twirp_url(SIP_SERVICE, "TransferSIPParticipant");
        let token = self.token(&request.room_name)?;
        debug!("Transfer request: {:?}", request);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(
                "Transferred {} in {} to {}",
                request.participant_identity, request.room_name, request.transfer_to
            );
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let twirp: TwirpError = serde_json::from_str(&body).unwrap_or_default();
        match twirp.meta.get("sip_status_code") {
            Some(code) => Err(TelephonyError::Sip {
                status_code: code.clone(),
                status: twirp
                    .meta
                    .get("sip_status")
                    .cloned()
                    .unwrap_or_else(|| twirp.msg.clone()),
            }),
            None => Err(TelephonyError::Remote {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

impl std::fmt::Debug for LiveKitTransfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveKitTransfer")
            .field("config", &self.config)
            .finish()
    }
}
