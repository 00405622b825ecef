//! Call history record sent to `POST /history/create`.

use std::time::Duration;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One tool call executed during the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecution {
    pub name: String,
    pub arguments: Value,
    pub output: String,
    #[serde(default)]
    pub is_error: bool,
}

/// A single entry in the call history, in conversation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEntry {
    /// A conversation turn.
    Message { role: String, content: String },
    /// A batch of tool calls the model made in one step.
    FunctionToolsExecuted { calls: Vec<ToolExecution> },
}

impl HistoryEntry {
    /// Create a conversation turn.
    pub fn message(role: impl Into<String>, content: impl Into<String>) -> Self {
        HistoryEntry::Message {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Summary of a completed call. Built once at call end and never mutated
/// after it has been sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub agent_id: String,
    /// Call start date, `YYYY-MM-DD`.
    pub date: String,
    /// Call start time, `HH:MM:SS`.
    pub time: String,
    /// Call duration in whole seconds.
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub conversation: Vec<HistoryEntry>,
}

impl HistoryRecord {
    /// Build a record for a call that started at `started_at` and lasted `duration`.
    pub fn new<Tz>(
        agent_id: impl Into<String>,
        started_at: DateTime<Tz>,
        duration: Duration,
        conversation: Vec<HistoryEntry>,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            agent_id: agent_id.into(),
            date: started_at.format("%Y-%m-%d").to_string(),
            time: started_at.format("%H:%M:%S").to_string(),
            duration: duration.as_secs(),
            summary: None,
            conversation,
        }
    }

    /// Attach a summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Number of conversation turns (tool batches excluded).
    pub fn turn_count(&self) -> usize {
        self.conversation
            .iter()
            .filter(|e| matches!(e, HistoryEntry::Message { .. }))
            .count()
    }
}
