//! Tools exposed to the voice model.

mod book_appointment;
mod call_forward;
mod check_availability;
mod is_org_open;

pub use book_appointment::BookAppointment;
pub use call_forward::CallForward;
pub use check_availability::CheckAvailability;
pub use is_org_open::IsOrgOpen;

use chrono::{DateTime, Duration, Utc};

use crate::calendar::APPOINTMENT_MINUTES;
use crate::datetime::parse_date_time;

/// Reply when no calendar provider is configured.
pub const CALENDAR_UNAVAILABLE: &str =
    "Calendar service is currently unavailable. Please try again later.";

/// The appointment slot for a spoken date and time, starting from now.
pub(crate) fn appointment_slot(date: &str, time: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = parse_date_time(date, time, Utc::now().naive_utc())?.and_utc();
    Some((start, start + Duration::minutes(APPOINTMENT_MINUTES)))
}

pub(crate) fn not_understood(date: &str, time: &str) -> String {
    format!("Could not understand the date or time: {} {}", date, time)
}
