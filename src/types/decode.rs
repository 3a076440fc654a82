//! Lenient field decoders
//!
//! The admin API echoes multipart writes back verbatim, so nested fields can
//! arrive as JSON-encoded strings and lists as scalars. These decoders accept
//! the known shapes and fall back to a documented default instead of failing
//! the whole record. They are used through `#[serde(deserialize_with)]` so
//! normalization happens once, when a response is decoded.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

/// Object or JSON-encoded object; anything else yields `None`
pub(crate) fn json_or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_embedded(value))
}

/// Object or JSON-encoded object; anything else yields `T::default()`
pub(crate) fn json_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_embedded(value).unwrap_or_default())
}

/// Any decodable value; undecodable values yield `None`
pub(crate) fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// Array (undecodable items dropped) or JSON-encoded array; otherwise `[]`
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode_items(value))
}

/// List of strings, or a single string as a one-element list
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        Value::String(s) => vec![s],
        other => decode_items(other),
    })
}

/// List whose string items may themselves be JSON arrays, flattened.
/// Strings that are not JSON are kept verbatim.
pub(crate) fn flattened_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let mut out = Vec::new();
    flatten_into(value, &mut out);
    Ok(out)
}

/// String, with null or non-string values as `""`
pub(crate) fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Object or JSON-encoded object; otherwise `{}`
pub(crate) fn json_object<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_embedded(value).unwrap_or_default())
}

/// RFC 3339 timestamp; unparsable values yield `None`
pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

fn parse_embedded<T: DeserializeOwned>(value: Value) -> Option<T> {
    match value {
        Value::Null => None,
        Value::String(s) => match serde_json::from_str(&s) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(error = %err, "Discarding unparsable embedded JSON field");
                None
            }
        },
        other => serde_json::from_value(other).ok(),
    }
}

fn decode_items<T: DeserializeOwned>(value: Value) -> Vec<T> {
    let items = match value {
        Value::Array(items) => items,
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

fn flatten_into(value: Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(parsed @ (Value::Array(_) | Value::String(_))) => flatten_into(parsed, out),
            _ if s.trim().is_empty() => {}
            _ => out.push(s),
        },
        _ => {}
    }
}
