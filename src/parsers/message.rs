use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::models::{MessageRecord, RawMessage};

/// Keys probed inside nested text containers (`text`, attachment payloads)
const NESTED_TEXT_KEYS: [&str; 3] = ["text", "body", "message"];
/// Keys probed on each share item
const SHARE_TEXT_KEYS: [&str; 3] = ["text", "name", "description"];

/// Validated shape of one message item. Everything except `id` and `created_time` is
/// optional and kept as a loose value so shape drift in those fields never drops a
/// message.
#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_message_id")]
    id: String,
    #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_created_time")]
    created_time: DateTime<Utc>,
    #[serde(default)]
    from: Option<Value>,
    #[serde(default)]
    to: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    text: Option<Value>,
    #[serde(default)]
    attachments: Option<Value>,
    #[serde(default)]
    shares: Option<Value>,
}

/// Normalize one raw message into a [`MessageRecord`].
///
/// Returns `None` (drop) when the item is not an object, lacks a non-empty string `id`,
/// or lacks a parseable `created_time`. No substitute values are ever produced.
pub fn normalize_message(raw: RawMessage) -> Option<MessageRecord> {
    let wire = match serde_json::from_value::<WireMessage>(raw.into_value()) {
        Ok(wire) => wire,
        Err(e) => {
            tracing::debug!("dropping message: {}", e);
            return None;
        }
    };

    let text = extract_text(&wire);
    let (sender_id, sender_username) = extract_sender(wire.from.as_ref());
    let recipient_ids = extract_recipients(wire.to.as_ref());

    Some(MessageRecord {
        id: wire.id,
        created_time: wire.created_time,
        sender_id,
        sender_username,
        recipient_ids,
        text,
    })
}

/// Normalize a page's items, preserving delivery order and dropping invalid ones.
pub fn normalize_items(items: Vec<RawMessage>) -> Vec<MessageRecord> {
    let total = items.len();
    let records: Vec<MessageRecord> = items.into_iter().filter_map(normalize_message).collect();
    let dropped = total - records.len();
    if dropped > 0 {
        tracing::debug!("normalized {} of {} messages ({} dropped)", records.len(), total, dropped);
    }
    records
}

fn extract_text(wire: &WireMessage) -> Option<String> {
    extract_text_fields(
        wire.message.as_ref(),
        wire.text.as_ref(),
        wire.attachments.as_ref(),
        wire.shares.as_ref(),
    )
}

fn extract_text_fields(
    message: Option<&Value>,
    text: Option<&Value>,
    attachments: Option<&Value>,
    shares: Option<&Value>,
) -> Option<String> {
    if let Some(direct) = message.and_then(candidate) {
        return Some(direct);
    }

    match text {
        Some(Value::String(_)) => {
            if let Some(found) = text.and_then(candidate) {
                return Some(found);
            }
        }
        Some(obj @ Value::Object(_)) => {
            if let Some(found) = first_candidate(obj, &NESTED_TEXT_KEYS) {
                return Some(found);
            }
        }
        _ => {}
    }

    for item in data_items(attachments) {
        if let Some(found) = item.get("text").and_then(candidate) {
            return Some(found);
        }
        if let Some(payload @ Value::Object(_)) = item.get("payload")
            && let Some(found) = first_candidate(payload, &NESTED_TEXT_KEYS)
        {
            return Some(found);
        }
    }

    data_items(shares).find_map(|item| first_candidate(item, &SHARE_TEXT_KEYS))
}

/// Trimmed, non-empty string content of `value`
fn candidate(value: &Value) -> Option<String> {
    let text = value.as_str()?.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

fn first_candidate(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| obj.get(*key).and_then(candidate))
}

/// Object items of a `{ "data": [...] }` container; anything else yields nothing
fn data_items(container: Option<&Value>) -> impl Iterator<Item = &Value> {
    container
        .and_then(|c| c.get("data"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|item| item.is_object())
}

fn extract_sender(from: Option<&Value>) -> (Option<String>, Option<String>) {
    match from {
        Some(obj @ Value::Object(_)) => {
            (obj.get("id").and_then(candidate), obj.get("username").and_then(candidate))
        }
        _ => (None, None),
    }
}

fn extract_recipients(to: Option<&Value>) -> Vec<String> {
    data_items(to).filter_map(|item| item.get("id").and_then(candidate)).collect()
}
