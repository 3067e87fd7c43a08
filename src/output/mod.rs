//! Plain (non-interactive) presentation of fetch results.
//!
//! Three formats: human-readable text, one JSON record per line, and the whole run as
//! a single JSON document. Text output is sanitized; JSON output is left to the JSON
//! encoder, which escapes control characters itself.

use std::io::{self, Write};

use serde::Serialize;

use crate::fetcher::ErrorKind;
use crate::models::{ConversationOutcome, FetchOutcome, MessageRecord};
use crate::utils::strip_ansi_codes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per record per line
    Raw,
    /// Whole outcome as one pretty-printed JSON document
    Json,
}

impl OutputFormat {
    /// Whether conversations can be written as soon as each one finishes.
    pub fn is_streaming(&self) -> bool {
        !matches!(self, Self::Json)
    }
}

/// Write one conversation in the text format.
pub fn write_conversation_text<W: Write>(w: &mut W, outcome: &ConversationOutcome) -> io::Result<()> {
    writeln!(w, "conversation {}:", strip_ansi_codes(&outcome.conversation_id))?;

    for record in &outcome.records {
        let label = strip_ansi_codes(record.sender_label());
        match &record.text {
            Some(text) => writeln!(w, "  {}: {}", label, strip_ansi_codes(text))?,
            None => {
                writeln!(w, "  {} (raw):", label)?;
                let pretty = serde_json::to_string_pretty(record).map_err(io::Error::other)?;
                for line in pretty.lines() {
                    writeln!(w, "    {}", strip_ansi_codes(line))?;
                }
            }
        }
    }

    match outcome.error() {
        Some(err) => writeln!(w, "  error: {}", strip_ansi_codes(&err.to_string()))?,
        None if outcome.records.is_empty() => writeln!(w, "  (no messages retrieved)")?,
        None => {}
    }
    if outcome.reached_page_limit() {
        writeln!(w, "  (stopped at page limit)")?;
    }
    Ok(())
}

/// Write the conversations that were never attempted.
pub fn write_skipped_text<W: Write>(w: &mut W, skipped: &[String]) -> io::Result<()> {
    for conversation_id in skipped {
        writeln!(w, "conversation {}:", strip_ansi_codes(conversation_id))?;
        writeln!(w, "  skipped: access token was rejected")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct RawLine<'a> {
    conversation_id: &'a str,
    #[serde(flatten)]
    record: &'a MessageRecord,
}

/// Write each record of a conversation as a JSON object on its own line.
pub fn write_conversation_raw<W: Write>(w: &mut W, outcome: &ConversationOutcome) -> io::Result<()> {
    for record in &outcome.records {
        let line = RawLine { conversation_id: &outcome.conversation_id, record };
        serde_json::to_writer(&mut *w, &line).map_err(io::Error::other)?;
        writeln!(w)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonError {
    kind: ErrorKind,
    message: String,
}

#[derive(Serialize)]
struct JsonConversation<'a> {
    conversation_id: &'a str,
    status: &'static str,
    pages_fetched: u32,
    reached_page_limit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonError>,
    records: &'a [MessageRecord],
}

#[derive(Serialize)]
struct JsonRun<'a> {
    conversations: Vec<JsonConversation<'a>>,
    skipped: &'a [String],
}

/// Write the whole outcome as a pretty-printed JSON document.
pub fn write_json<W: Write>(w: &mut W, outcome: &FetchOutcome) -> io::Result<()> {
    let run = JsonRun {
        conversations: outcome
            .conversations()
            .iter()
            .map(|c| JsonConversation {
                conversation_id: &c.conversation_id,
                status: if c.is_success() { "ok" } else { "failed" },
                pages_fetched: c.pages_fetched,
                reached_page_limit: c.reached_page_limit(),
                error: c.error().map(|e| JsonError { kind: e.kind(), message: e.to_string() }),
                records: &c.records,
            })
            .collect(),
        skipped: outcome.skipped(),
    };
    serde_json::to_writer_pretty(&mut *w, &run).map_err(io::Error::other)?;
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    use super::*;
    use crate::fetcher::FetchError;
    use crate::models::ConversationStatus;

    fn record(id: &str, username: Option<&str>, text: Option<&str>) -> MessageRecord {
        MessageRecord {
            id: id.to_string(),
            created_time: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
            sender_id: Some("1789".to_string()),
            sender_username: username.map(str::to_string),
            recipient_ids: Vec::new(),
            text: text.map(str::to_string),
        }
    }

    fn outcome(records: Vec<MessageRecord>, status: ConversationStatus) -> ConversationOutcome {
        ConversationOutcome { conversation_id: "c1".to_string(), records, pages_fetched: 1, status }
    }

    fn ok() -> ConversationStatus {
        ConversationStatus::Exhausted { reached_page_limit: false }
    }

    fn render(outcome: &ConversationOutcome) -> String {
        let mut buf = Vec::new();
        write_conversation_text(&mut buf, outcome).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_lines_use_sender_label() {
        let out = render(&outcome(
            vec![record("m1", Some("alice"), Some("hi")), record("m2", None, Some("yo"))],
            ok(),
        ));
        assert_eq!(out, "conversation c1:\n  alice: hi\n  1789: yo\n");
    }

    #[test]
    fn test_textless_record_printed_raw_and_indented() {
        let out = render(&outcome(vec![record("m1", Some("alice"), None)], ok()));
        assert!(out.contains("  alice (raw):\n    {\n"));
        assert!(out.contains("    \"id\": \"m1\""));
    }

    #[test]
    fn test_empty_success_and_failure_markers() {
        assert_eq!(render(&outcome(vec![], ok())), "conversation c1:\n  (no messages retrieved)\n");

        let failed = outcome(
            vec![record("m1", Some("alice"), Some("hi"))],
            ConversationStatus::Failed(FetchError::NotFound { message: "gone".into() }),
        );
        let out = render(&failed);
        assert!(out.contains("  alice: hi\n"));
        assert!(out.contains("  error: "));
        assert!(!out.contains("no messages retrieved"));
    }

    #[test]
    fn test_page_limit_marker() {
        let out = render(&outcome(
            vec![record("m1", None, Some("hi"))],
            ConversationStatus::Exhausted { reached_page_limit: true },
        ));
        assert!(out.ends_with("  (stopped at page limit)\n"));
    }

    #[test]
    fn test_text_output_strips_escape_sequences() {
        let out = render(&outcome(vec![record("m1", Some("eve"), Some("\x1b[2Jgotcha"))], ok()));
        assert!(out.contains("  eve: gotcha\n"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_raw_lines_carry_conversation_id() {
        let mut buf = Vec::new();
        let oc = outcome(vec![record("m1", None, Some("a")), record("m2", None, None)], ok());
        write_conversation_raw(&mut buf, &oc).unwrap();

        let lines: Vec<Value> = String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["conversation_id"], "c1");
        assert_eq!(lines[0]["text"], "a");
        assert!(lines[1].get("text").is_none());
    }

    #[test]
    fn test_json_document_shape() {
        let failed = ConversationOutcome {
            conversation_id: "c2".into(),
            records: vec![],
            pages_fetched: 0,
            status: ConversationStatus::Failed(FetchError::Auth { message: "bad".into() }),
        };
        let run = FetchOutcome::new(
            vec![outcome(vec![record("m1", None, Some("a"))], ok()), failed],
            vec!["c3".into()],
        );
        let mut buf = Vec::new();
        write_json(&mut buf, &run).unwrap();

        let doc: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(doc["conversations"][0]["status"], "ok");
        assert!(doc["conversations"][0].get("error").is_none());
        assert_eq!(doc["conversations"][1]["error"]["kind"], "auth_error");
        assert_eq!(doc["skipped"][0], "c3");
    }
}
