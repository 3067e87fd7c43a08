use anyhow::{Context, Result};
use arboard::Clipboard;

use crate::models::MessageRecord;
use crate::utils::strip_ansi_codes;

/// Maximum clipboard size (1MB). A single message is far below this.
const MAX_CLIPBOARD_SIZE: usize = 1024 * 1024;

/// Clipboard backend (allows mocking in tests)
pub trait ClipboardProvider {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard via arboard. The handle is opened on each copy so a headless
/// session only fails when the user actually copies.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardProvider for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = Clipboard::new().context("Failed to initialize clipboard")?;
        clipboard.set_text(text).context("Failed to set clipboard contents")?;
        Ok(())
    }
}

fn validate_clipboard_text(text: &str) -> Result<()> {
    if text.is_empty() {
        anyhow::bail!("Cannot copy empty text to clipboard");
    }

    if text.len() > MAX_CLIPBOARD_SIZE {
        anyhow::bail!(
            "Text too large for clipboard ({} bytes, max {})",
            text.len(),
            MAX_CLIPBOARD_SIZE
        );
    }

    Ok(())
}

/// Text placed on the clipboard for a message: its text, or the record as JSON when
/// the message has no text.
pub fn clipboard_text_for(record: &MessageRecord) -> Result<String> {
    let text = match &record.text {
        Some(text) => text.clone(),
        None => serde_json::to_string_pretty(record).context("Failed to encode message")?,
    };
    Ok(strip_ansi_codes(&text))
}

/// Copy a message to the clipboard through `provider`.
///
/// # Errors
/// Returns error if:
/// - The resulting text is empty or larger than 1MB
/// - The clipboard is unavailable (headless session, denied access)
pub fn copy_message(provider: &mut dyn ClipboardProvider, record: &MessageRecord) -> Result<()> {
    let text = clipboard_text_for(record)?;
    validate_clipboard_text(&text)?;
    provider.set_text(&text)
}
