//! Deciding which tools an agent gets for a call.

use std::sync::Arc;

use backend_client::{Agent, BackendApi, ToolDescriptor};
use tracing::{debug, info, warn};

use crate::calendar::CalendarProvider;
use crate::config::TransferConfig;
use crate::registry::ToolRegistry;
use crate::telephony::CallTransfer;
use crate::tools::{BookAppointment, CallForward, CheckAvailability, IsOrgOpen};

/// Process-wide providers the tools are built from.
#[derive(Clone)]
pub struct ToolDeps {
    pub backend: Arc<dyn BackendApi>,
    /// None when no calendar credentials are configured.
    pub calendar: Option<Arc<dyn CalendarProvider>>,
    pub transfer: Arc<dyn CallTransfer>,
    pub transfer_config: TransferConfig,
}

async fn fetch_descriptor(agent: &Agent, deps: &ToolDeps) -> Option<ToolDescriptor> {
    let Some(tool_id) = agent.tool_id.as_deref() else {
        debug!("Agent {} has no tool set", agent.id);
        return None;
    };

    match deps.backend.fetch_tool_descriptor(tool_id).await {
        Ok(descriptor) => Some(descriptor),
        Err(e) => {
            warn!(
                "Failed to fetch tool set {} for agent {}: {}; continuing without tools",
                tool_id, agent.id, e
            );
            None
        }
    }
}

fn register_appointment_tools(registry: &mut ToolRegistry, descriptor: &ToolDescriptor, deps: &ToolDeps) {
    if !descriptor.has_appointment_tools {
        return;
    }
    registry.register(CheckAvailability::new(deps.calendar.clone()));
    registry.register(BookAppointment::new(deps.calendar.clone()));
    registry.register(CallForward::new(
        deps.transfer.clone(),
        deps.transfer_config.clone(),
    ));
}

fn register_default_tools(registry: &mut ToolRegistry, descriptor: &ToolDescriptor, deps: &ToolDeps) {
    if !descriptor.has_default_tools {
        return;
    }
    registry.register(IsOrgOpen::new(deps.backend.clone()));
    registry.register(CallForward::new(
        deps.transfer.clone(),
        deps.transfer_config.clone(),
    ));
}

/// Build the appointment tool set for `agent`.
///
/// With the appointment capability the registry holds exactly
/// `check_availability`, `book_appointment` and `call_forward`; without it
/// (or with no tool-set reference, or a failed descriptor fetch) it is empty.
pub async fn resolve_tools(agent: &Agent, deps: &ToolDeps) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    if let Some(descriptor) = fetch_descriptor(agent, deps).await {
        register_appointment_tools(&mut registry, &descriptor, deps);
    }
    registry
}

/// Build the business-hours tool set for `agent`: `is_org_open` and
/// `call_forward` when the descriptor has the default capability.
pub async fn resolve_default_tools(agent: &Agent, deps: &ToolDeps) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    if let Some(descriptor) = fetch_descriptor(agent, deps).await {
        register_default_tools(&mut registry, &descriptor, deps);
    }
    registry
}

/// Everything a call gets: the union of [`resolve_tools`] and
/// [`resolve_default_tools`], from a single descriptor fetch.
pub async fn resolve_call_tools(agent: &Agent, deps: &ToolDeps) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    if let Some(descriptor) = fetch_descriptor(agent, deps).await {
        register_appointment_tools(&mut registry, &descriptor, deps);
        register_default_tools(&mut registry, &descriptor, deps);
    }

    info!(
        "Resolved {} tools for agent {}: {:?}",
        registry.len(),
        agent.id,
        registry.list_tools()
    );
    registry
}
