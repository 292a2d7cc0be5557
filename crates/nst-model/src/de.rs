//! Lenient deserializers for the næringsspesifikasjon JSON documents.
//!
//! The reporting schema is loosely typed in practice: years arrive both as
//! `2023` and `"2023"`, type codes as `3000` and `"3000"`, and arrays are
//! sometimes `null` instead of absent.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept `null`, a missing field or an array.
pub fn vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a string or a number and keep its textual form.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| value_to_string(&value)))
}

/// Accept an integer year given as a number or a numeric string.
pub fn opt_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .and_then(|year| i32::try_from(year).ok())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid year: {number}"))),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => text
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid year: {text}"))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid year: {other}"
        ))),
    }
}

/// Render a scalar JSON value as text; `None` for null, empty strings and
/// structured values.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
