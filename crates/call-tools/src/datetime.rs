//! Parsing of spoken dates and times ("Monday, January 26th", "2:00 PM").
//!
//! Relative expressions ("tomorrow", "Friday") are resolved against a
//! caller-supplied `now` so results are reproducible. A month and day with
//! no year that already passed this year roll over to next year. Results
//! are naive timestamps interpreted as UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

const FILLER: [&str; 5] = ["on", "the", "of", "at", "this"];

const ISO_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a date and a time of day spoken separately.
///
/// An empty `date` means today. An empty `time` is only accepted when `date`
/// is a full ISO timestamp. Returns None when either part is not understood.
pub fn parse_date_time(date: &str, time: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let date = date.trim();
    let time = time.trim();

    if time.is_empty() {
        return parse_iso_datetime(date);
    }

    let day = parse_date(date, now.date())?;
    let clock = parse_time(time)?;
    Some(day.and_time(clock))
}

fn parse_iso_datetime(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    ISO_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Parse a calendar date relative to `today`.
pub fn parse_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let normalized = raw.to_lowercase().replace(',', " ");
    let tokens: Vec<String> = normalized
        .split_whitespace()
        .filter(|t| !FILLER.contains(t))
        .map(strip_ordinal)
        .collect();

    match tokens.as_slice() {
        [] => return Some(today),
        [single] => {
            if let Some(date) = parse_numeric_date(single, today) {
                return Some(date);
            }
            match single.as_str() {
                "today" => return Some(today),
                "tomorrow" => return today.succ_opt(),
                _ => {}
            }
        }
        [a, b, c] if a == "day" && b == "after" && c == "tomorrow" => {
            return today.checked_add_signed(Duration::days(2));
        }
        _ => {}
    }

    let mut month = None;
    let mut weekday = None;
    let mut day = None;
    let mut year = None;
    let mut strictly_after = false;

    for token in &tokens {
        if token == "next" {
            strictly_after = true;
        } else if let Some(m) = match_month(token) {
            month = Some(m);
        } else if let Some(w) = match_weekday(token) {
            weekday = Some(w);
        } else if let Ok(n) = token.parse::<u32>() {
            if n >= 1000 {
                year = Some(n as i32);
            } else if day.is_none() {
                day = Some(n);
            } else {
                return None;
            }
        }
    }

    if let Some(month) = month {
        let day = day?;
        return match year {
            Some(year) => NaiveDate::from_ymd_opt(year, month, day),
            None => {
                let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
                match this_year {
                    Some(date) if date >= today => Some(date),
                    _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
                }
            }
        };
    }

    let weekday = weekday?;
    let current = today.weekday().num_days_from_monday() as i64;
    let target = weekday.num_days_from_monday() as i64;
    let mut ahead = (target - current).rem_euclid(7);
    if ahead == 0 && strictly_after {
        ahead = 7;
    }
    let date = today.checked_add_signed(Duration::days(ahead))?;
    // "Friday the 27th" names no real date when that Friday is the 26th.
    match day {
        Some(day) if date.day() != day => None,
        _ => Some(date),
    }
}

/// ISO (`2024-01-26`, optionally followed by `T...`) or US slash dates
/// (`1/26`, `1/26/24`, `1/26/2024`).
fn parse_numeric_date(token: &str, today: NaiveDate) -> Option<NaiveDate> {
    let iso = token.split('t').next().unwrap_or(token);
    if let Ok(date) = NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        return Some(date);
    }

    let parts: Vec<&str> = token.split('/').collect();
    let (month, day, year): (u32, u32, Option<i32>) = match parts.as_slice() {
        [m, d] => (m.parse().ok()?, d.parse().ok()?, None),
        [m, d, y] => {
            let y: i32 = y.parse().ok()?;
            let y = if y < 100 { 2000 + y } else { y };
            (m.parse().ok()?, d.parse().ok()?, Some(y))
        }
        _ => return None,
    };

    match year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day),
        None => match NaiveDate::from_ymd_opt(today.year(), month, day) {
            Some(date) if date >= today => Some(date),
            _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
        },
    }
}

/// Parse a time of day: "2:00 PM", "2pm", "14:00", "9:30 a.m.", "noon".
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let lowered = raw.trim().to_lowercase();
    let lowered = lowered.strip_prefix("at ").unwrap_or(&lowered).trim();

    match lowered {
        "noon" | "midday" => return NaiveTime::from_hms_opt(12, 0, 0),
        "midnight" => return NaiveTime::from_hms_opt(0, 0, 0),
        _ => {}
    }

    let compact: String = lowered
        .replace("o'clock", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();

    let (clock, pm) = if let Some(rest) = compact.strip_suffix("am") {
        (rest, Some(false))
    } else if let Some(rest) = compact.strip_suffix("pm") {
        (rest, Some(true))
    } else {
        (compact.as_str(), None)
    };

    let mut parts = clock.split(':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    let second: u32 = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    let hour = match pm {
        Some(pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            hour % 12 + if pm { 12 } else { 0 }
        }
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, second)
}

fn strip_ordinal(token: &str) -> String {
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(number) = token.strip_suffix(suffix) {
            if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
                return number.to_string();
            }
        }
    }
    token.to_string()
}

fn match_month(token: &str) -> Option<u32> {
    if token.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|name| name.starts_with(token))
        .map(|i| i as u32 + 1)
}

fn match_weekday(token: &str) -> Option<Weekday> {
    if token.len() < 3 {
        return None;
    }
    WEEKDAYS
        .iter()
        .find(|(name, _)| name.starts_with(token))
        .map(|(_, weekday)| *weekday)
}
