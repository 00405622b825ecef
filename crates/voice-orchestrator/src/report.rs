//! Turning a session report into history entries.

use backend_client::HistoryEntry;

use crate::runtime::{SessionEvent, SessionReport};

/// Conversation entries for the history record, in event order.
///
/// Conversation items become messages; tool batches are kept as-is.
/// Items with no text and all other event kinds are dropped.
pub fn conversation_from_report(report: &SessionReport) -> Vec<HistoryEntry> {
    report
        .events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::ConversationItemAdded { item } => {
                let text = item.text();
                if text.trim().is_empty() {
                    None
                } else {
                    Some(HistoryEntry::message(item.role.clone(), text))
                }
            }
            SessionEvent::FunctionToolsExecuted { calls } if !calls.is_empty() => {
                Some(HistoryEntry::FunctionToolsExecuted {
                    calls: calls.clone(),
                })
            }
            _ => None,
        })
        .collect()
}
