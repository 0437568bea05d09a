//! Lenient deserializers for upstream JSON fields.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a counter that may arrive as a number, a numeric string, a float or
/// garbage. Anything unusable becomes 0.
pub fn count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(value_to_count).unwrap_or(0))
}

/// Convert a loosely-typed JSON value into a counter.
pub fn value_to_count(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => crate::scrapers::extract::parse_count(s),
        Value::Bool(b) => *b as i64,
        _ => 0,
    }
}

/// Read an optional string, treating `null`, `""` and non-strings as missing.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
