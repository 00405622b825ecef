//! Call-scoped tools for the voice agent.
//!
//! Tools are functions the voice model can call mid-conversation. Each call
//! gets its own [`ToolRegistry`], built by [`resolve_call_tools`] from the agent's
//! tool-set descriptor and bound to that call's [`CallContext`].
//!
//! # Tools
//!
//! - [`CheckAvailability`] - Is a 30-minute calendar slot free?
//! - [`BookAppointment`] - Create a calendar event for the caller.
//! - [`CallForward`] - SIP-transfer the caller to a fixed number.
//! - [`IsOrgOpen`] - Ask the backend whether the business is open.
//!
//! Providers sit behind traits ([`CalendarProvider`], [`CallTransfer`],
//! `backend_client::BackendApi`) so tests can swap in fakes.
//!
//! # Example
//!
//! ```rust,ignore
//! let deps = ToolDeps { backend, calendar, transfer, transfer_config };
//! let mut registry = resolve_call_tools(&agent, &deps).await;
//! registry.set_context(CallContext::new(room, identity).with_phone_number(phone));
//!
//! let reply = registry
//!     .execute_json("check_availability", r#"{"date": "Friday", "time": "2pm"}"#)
//!     .await?;
//! ```

pub mod calendar;
pub mod config;
mod context;
pub mod datetime;
mod error;
mod registry;
mod resolve;
pub mod telephony;
mod tool;
pub mod tools;

pub use calendar::{
    calendar_from_config, CalendarEvent, CalendarProvider, GoogleCalendar, NewEvent,
    ServiceAccountKey,
};
pub use config::{CalendarConfig, LiveKitConfig, TransferConfig};
pub use context::{CallContext, UNKNOWN_PHONE_NUMBER};
pub use error::{CalendarError, TelephonyError, ToolError};
pub use registry::{ToolDefinition, ToolRegistry};
pub use resolve::{resolve_call_tools, resolve_default_tools, resolve_tools, ToolDeps};
pub use telephony::{CallTransfer, LiveKitTransfer, TransferRequest};
pub use tool::{Tool, ToolArgs, ToolOutput};
pub use tools::{BookAppointment, CallForward, CheckAvailability, IsOrgOpen};

// Re-export async_trait for implementors of the provider traits
pub use async_trait::async_trait;
