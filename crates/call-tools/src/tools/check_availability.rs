//! Appointment availability check against the calendar.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error};

use super::{appointment_slot, not_understood, CALENDAR_UNAVAILABLE};
use crate::calendar::CalendarProvider;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Checks whether a 30-minute slot is free.
pub struct CheckAvailability {
    calendar: Option<Arc<dyn CalendarProvider>>,
}

impl CheckAvailability {
    pub fn new(calendar: Option<Arc<dyn CalendarProvider>>) -> Self {
        Self { calendar }
    }
}

#[async_trait]
impl Tool for CheckAvailability {
    fn name(&self) -> &str {
        "check_availability"
    }

    fn description(&self) -> &str {
        "Check if a specific date and time is available for an appointment."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "date": {
                    "type": "string",
                    "description": "The date to check (e.g., \"Monday, January 26th\")"
                },
                "time": {
                    "type": "string",
                    "description": "The time to check (e.g., \"2:00 PM\")"
                }
            },
            "required": ["date", "time"]
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let date = args.get_string("date")?;
        let time = args.get_string("time")?;

        let Some(calendar) = &self.calendar else {
            return Ok(ToolOutput::failure(CALENDAR_UNAVAILABLE));
        };

        let Some((start, end)) = appointment_slot(&date, &time) else {
            return Ok(ToolOutput::failure(not_understood(&date, &time)));
        };

        debug!("Checking availability from {} to {}", start, end);
        match calendar.list_events(start, end).await {
            Ok(events) if events.is_empty() => Ok(ToolOutput::success(format!(
                "Yes, {} on {} is available.",
                time, date
            ))),
            Ok(events) => {
                debug!("{} conflicting events", events.len());
                Ok(ToolOutput::success(format!(
                    "Sorry, {} on {} is already booked.",
                    time, date
                )))
            }
            Err(e) => {
                error!("Error checking availability: {}", e);
                Ok(ToolOutput::failure(
                    "An error occurred while checking availability.",
                ))
            }
        }
    }
}
