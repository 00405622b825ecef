//! Appointment booking.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, info};

use super::{appointment_slot, not_understood, CALENDAR_UNAVAILABLE};
use crate::calendar::{CalendarProvider, NewEvent};
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Books a 30-minute appointment, tagged with the caller's phone number.
pub struct BookAppointment {
    calendar: Option<Arc<dyn CalendarProvider>>,
}

impl BookAppointment {
    pub fn new(calendar: Option<Arc<dyn CalendarProvider>>) -> Self {
        Self { calendar }
    }
}

#[async_trait]
impl Tool for BookAppointment {
    fn name(&self) -> &str {
        "book_appointment"
    }

    fn description(&self) -> &str {
        "Book an appointment for a patient."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "The patient's full name."
                },
                "date": {
                    "type": "string",
                    "description": "The date of the appointment."
                },
                "time": {
                    "type": "string",
                    "description": "The time of the appointment."
                }
            },
            "required": ["name", "date", "time"]
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let name = args.get_string("name")?;
        let date = args.get_string("date")?;
        let time = args.get_string("time")?;

        info!(
            "Booking for caller {} in room {}",
            args.context.phone_number,
            args.context.room_name.as_deref().unwrap_or("-")
        );

        let Some(calendar) = &self.calendar else {
            return Ok(ToolOutput::failure(CALENDAR_UNAVAILABLE));
        };

        let Some((start, _)) = appointment_slot(&date, &time) else {
            return Ok(ToolOutput::failure(not_understood(&date, &time)));
        };

        let event = NewEvent::appointment(&name, &args.context.phone_number, start);
        match calendar.insert_event(&event).await {
            Ok(created) => Ok(ToolOutput::success(format!(
                "Appointment confirmed for {} on {} at {}. Link: {}",
                name,
                date,
                time,
                created.html_link.as_deref().unwrap_or("not available")
            ))),
            Err(e) => {
                error!("Error booking appointment: {}", e);
                Ok(ToolOutput::failure(
                    "An error occurred while booking the appointment.",
                ))
            }
        }
    }
}
