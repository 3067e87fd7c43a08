use chrono::{DateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Format used by the Graph API for `created_time`, e.g. `2024-01-15T10:30:00+0000`
const GRAPH_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Parse a `created_time` string into UTC.
///
/// Accepts the Graph API form first and RFC3339 second. Returns `None` for anything else.
pub fn parse_created_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_str(value, GRAPH_TIME_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Custom deserializer for `created_time`; only strings in a supported format are accepted
pub fn deserialize_created_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => parse_created_time(&s)
            .ok_or_else(|| Error::custom(format!("unparseable created_time: {:?}", s))),
        _ => Err(Error::custom("created_time must be a string")),
    }
}

/// Custom deserializer for message IDs that rejects empty strings
pub fn deserialize_message_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.trim().is_empty() {
        return Err(Error::custom("message id cannot be empty"));
    }
    Ok(s)
}
