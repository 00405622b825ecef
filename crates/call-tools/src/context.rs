//! Per-call context handed to tools.

use serde::Serialize;

/// Phone number recorded when the caller is not on a SIP leg.
pub const UNKNOWN_PHONE_NUMBER: &str = "Unknown";

/// Facts about the current call that tools may need.
///
/// Built once the participant has joined and the agent is resolved. Every
/// field has a concrete value from construction on; absent room or
/// participant information is `None`, never an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallContext {
    /// Caller's phone number, or "Unknown".
    pub phone_number: String,
    /// Room the call is taking place in.
    pub room_name: Option<String>,
    /// Identity of the remote participant (the caller).
    pub participant_identity: Option<String>,
    /// Owner of the agent, used for the business-hours check.
    pub user_id: Option<String>,
}

impl CallContext {
    /// Create a context for a caller in `room_name`.
    pub fn new(room_name: impl Into<String>, participant_identity: impl Into<String>) -> Self {
        Self {
            phone_number: UNKNOWN_PHONE_NUMBER.to_string(),
            room_name: Some(room_name.into()),
            participant_identity: Some(participant_identity.into()),
            user_id: None,
        }
    }

    /// Set the caller's phone number. Blank numbers are stored as "Unknown".
    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        let phone_number: String = phone_number.into();
        self.phone_number = if phone_number.trim().is_empty() {
            UNKNOWN_PHONE_NUMBER.to_string()
        } else {
            phone_number
        };
        self
    }

    /// Set the agent owner's user id.
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Room and participant identity, if both are known.
    pub fn transfer_target(&self) -> Option<(&str, &str)> {
        match (self.room_name.as_deref(), self.participant_identity.as_deref()) {
            (Some(room), Some(identity)) if !room.is_empty() && !identity.is_empty() => {
                Some((room, identity))
            }
            _ => None,
        }
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self {
            phone_number: UNKNOWN_PHONE_NUMBER.to_string(),
            room_name: None,
            participant_identity: None,
            user_id: None,
        }
    }
}
