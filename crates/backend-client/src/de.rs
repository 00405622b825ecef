//! Lenient field deserializers for backend payloads.
//!
//! The backend is not strict about scalar types: ids arrive as strings or
//! integers, flags as booleans, numbers or strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a string or a number (stringified). Null and other types become None.
pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accept a boolean, 0/1, or "true"/"false"-style strings. Anything else is false.
pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64().map(|v| v != 0).unwrap_or(false),
        Some(Value::String(s)) => matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    })
}
