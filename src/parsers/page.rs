use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Cursor, PageResult, RawMessage};

/// A response body that does not match the paged-messages schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PageDecodeError(String);

#[derive(Debug, Deserialize)]
struct WirePage {
    #[serde(default)]
    data: Option<Vec<Value>>,
    #[serde(default)]
    paging: Option<Value>,
}

/// Decode one response body into a [`PageResult`].
///
/// The page container is the body's `messages` member when present (conversation
/// lookups with `fields=messages{...}`), otherwise the body itself. A missing or null
/// `data` array is an empty page; any other shape mismatch is an error.
pub fn decode_page(body: Value) -> Result<PageResult, PageDecodeError> {
    let mut obj = match body {
        Value::Object(obj) => obj,
        other => {
            return Err(PageDecodeError(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            )));
        }
    };

    let container = match obj.remove("messages") {
        Some(messages @ Value::Object(_)) => messages,
        Some(other) => {
            return Err(PageDecodeError(format!(
                "expected 'messages' to be an object, got {}",
                json_type_name(&other)
            )));
        }
        None => Value::Object(obj),
    };

    let wire: WirePage = serde_json::from_value(container)
        .map_err(|e| PageDecodeError(format!("invalid page body: {}", e)))?;

    let paging = wire.paging.unwrap_or(Value::Null);
    Ok(PageResult {
        items: wire.data.unwrap_or_default().into_iter().map(RawMessage::new).collect(),
        next_cursor: paging_cursor(&paging, "next"),
        previous_cursor: paging_cursor(&paging, "previous"),
    })
}

fn paging_cursor(paging: &Value, key: &str) -> Option<Cursor> {
    paging
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Cursor::new)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_page_with_cursors() {
        let page = decode_page(json!({
            "data": [{"id": "a"}, {"id": "b"}],
            "paging": {
                "cursors": {"after": "QVFI", "before": "QVFH"},
                "next": "https://graph.instagram.com/v22.0/c1/messages?after=QVFI",
                "previous": "https://graph.instagram.com/v22.0/c1/messages?before=QVFH"
            }
        }))
        .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(
            page.next_cursor.unwrap().as_str(),
            "https://graph.instagram.com/v22.0/c1/messages?after=QVFI"
        );
        assert!(page.previous_cursor.is_some());
    }

    #[test]
    fn test_decode_last_page_has_no_next() {
        let page = decode_page(json!({
            "data": [{"id": "a"}],
            "paging": {"cursors": {"after": "QVFI"}}
        }))
        .unwrap();
        assert!(page.is_last());
        assert!(page.previous_cursor.is_none());
    }

    #[test]
    fn test_decode_nested_messages_container() {
        let page = decode_page(json!({
            "id": "c1",
            "messages": {"data": [{"id": "a"}], "paging": {"next": "cursor-2"}}
        }))
        .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_cursor, Some(Cursor::new("cursor-2")));
    }

    #[test]
    fn test_decode_missing_data_is_empty_page() {
        let page = decode_page(json!({})).unwrap();
        assert!(page.items.is_empty());
        assert!(page.is_last());
    }

    #[test]
    fn test_decode_blank_next_is_absent() {
        let page = decode_page(json!({"data": [], "paging": {"next": "  "}})).unwrap();
        assert!(page.is_last());
    }

    #[test]
    fn test_decode_rejects_non_object_body() {
        let err = decode_page(json!([1, 2, 3])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_decode_rejects_non_array_data() {
        let err = decode_page(json!({"data": {"id": "a"}})).unwrap_err();
        assert!(err.to_string().contains("invalid page body"));
    }

    #[test]
    fn test_decode_rejects_non_object_messages() {
        let err = decode_page(json!({"messages": "nope"})).unwrap_err();
        assert!(err.to_string().contains("'messages'"));
    }
}
