use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single message normalized from the remote API.
///
/// `text` is `None` when the message carries no extractable caption (stickers, media
/// without a caption, reactions). Presenters must not collapse it into an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub created_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_username: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipient_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl MessageRecord {
    /// Display label for the sender: username, then sender id, then the message id.
    pub fn sender_label(&self) -> &str {
        self.sender_username
            .as_deref()
            .or(self.sender_id.as_deref())
            .unwrap_or(&self.id)
    }
}
