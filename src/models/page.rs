use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque paging token returned by the API.
///
/// The Graph API hands back full `next`/`previous` URLs; other deployments may return a
/// bare token. Callers never look inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One undecoded item from a page's `data` array.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage(Value);

impl RawMessage {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub(crate) fn into_value(self) -> Value {
        self.0
    }
}

/// Result of a single page request.
///
/// `next_cursor == None` is the only signal that forward pagination is finished.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageResult {
    pub items: Vec<RawMessage>,
    pub next_cursor: Option<Cursor>,
    pub previous_cursor: Option<Cursor>,
}

impl PageResult {
    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}
