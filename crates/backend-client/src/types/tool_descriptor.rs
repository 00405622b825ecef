//! Tool-set record returned by `GET /tools/get/{id}`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::de::{lenient_bool, opt_string_or_number};

#[derive(Debug, Default, Deserialize)]
struct ToolRecord {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "appointment_tools", deserialize_with = "lenient_bool")]
    has_appointment_tools: bool,
    #[serde(default, alias = "default_tools", deserialize_with = "lenient_bool")]
    has_default_tools: bool,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    user_id: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

/// Capabilities enabled for an agent's tool-set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ToolRecord")]
pub struct ToolDescriptor {
    pub id: String,
    pub name: String,
    /// Calendar availability, booking and call transfer.
    pub has_appointment_tools: bool,
    /// Business-hours check and call transfer.
    pub has_default_tools: bool,
    pub user_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ToolRecord> for ToolDescriptor {
    fn from(record: ToolRecord) -> Self {
        Self {
            id: record.id.unwrap_or_default(),
            name: record.name.unwrap_or_default(),
            has_appointment_tools: record.has_appointment_tools,
            has_default_tools: record.has_default_tools,
            user_id: record.user_id,
            created_at: record.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

impl ToolDescriptor {
    /// Create a descriptor with no capabilities enabled.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            has_appointment_tools: false,
            has_default_tools: false,
            user_id: None,
            created_at: None,
        }
    }

    /// Enable the appointment capability.
    pub fn with_appointment_tools(mut self) -> Self {
        self.has_appointment_tools = true;
        self
    }

    /// Enable the business-hours capability.
    pub fn with_default_tools(mut self) -> Self {
        self.has_default_tools = true;
        self
    }

    /// Whether any capability is enabled.
    pub fn has_any_capability(&self) -> bool {
        self.has_appointment_tools || self.has_default_tools
    }
}

/// Parse RFC 3339 timestamps and naive ISO timestamps (assumed UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
