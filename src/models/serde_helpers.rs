//! Lenient deserializers for optional widget settings
//!
//! Dashboard YAML is hand-written, so optional settings arrive with whatever
//! type the user typed. A mismatched type never rejects the configuration;
//! it is coerced the way a dashboard author would expect, falling back to
//! the documented default.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Truthiness of a loosely typed value (`1`, `"yes"` and `[]` count as true)
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Flag that defaults to off: any truthy value turns it on
pub fn truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| is_truthy(&v)))
}

/// Flag that defaults to on: only an explicit `false` turns it off
pub fn unless_false<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| v != Value::Bool(false)))
}

/// Display text; numbers and `true` are shown as typed, falsy values are empty
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(_) | Value::Bool(true) if is_truthy(&v) => Some(v.to_string()),
        _ => None,
    }))
}

/// Positive whole number; fractions round, numeric strings parse, anything
/// else is treated as unset
pub fn positive_size<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number
        .filter(|n| n.is_finite() && *n >= 1.0)
        .map(|n| n.round().min(f64::from(u32::MAX)) as u32))
}
