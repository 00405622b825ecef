//! Backend record types.

mod agent;
mod history;
mod tool_descriptor;

pub use agent::{Agent, AgentType, DEFAULT_AGENT_NAME, DEFAULT_VOICE};
pub use history::{HistoryEntry, HistoryRecord, ToolExecution};
pub use tool_descriptor::ToolDescriptor;
