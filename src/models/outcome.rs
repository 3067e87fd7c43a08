use super::MessageRecord;
use crate::fetcher::{ErrorKind, FetchError};

/// How a conversation's pagination ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationStatus {
    /// No further pages will be fetched. `reached_page_limit` is set when the API still
    /// advertised a next cursor but the configured page limit stopped pagination.
    Exhausted { reached_page_limit: bool },
    /// Pagination stopped on an error; any records fetched before it are kept.
    Failed(FetchError),
}

/// Terminal result for one requested conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationOutcome {
    pub conversation_id: String,
    /// Records sorted by the configured order.
    pub records: Vec<MessageRecord>,
    pub pages_fetched: u32,
    pub status: ConversationStatus,
}

impl ConversationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, ConversationStatus::Exhausted { .. })
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.status {
            ConversationStatus::Failed(err) => Some(err),
            ConversationStatus::Exhausted { .. } => None,
        }
    }

    pub fn reached_page_limit(&self) -> bool {
        matches!(self.status, ConversationStatus::Exhausted { reached_page_limit: true })
    }
}

/// Aggregate result of a multi-conversation run.
///
/// Outcomes are kept in input order; a repeated conversation ID appears once per
/// occurrence. `skipped` lists IDs that were never attempted because the run was
/// aborted by an authentication failure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchOutcome {
    conversations: Vec<ConversationOutcome>,
    skipped: Vec<String>,
}

impl FetchOutcome {
    pub fn new(conversations: Vec<ConversationOutcome>, skipped: Vec<String>) -> Self {
        Self { conversations, skipped }
    }

    pub fn conversations(&self) -> &[ConversationOutcome] {
        &self.conversations
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// First outcome recorded for `conversation_id`.
    pub fn get(&self, conversation_id: &str) -> Option<&ConversationOutcome> {
        self.conversations.iter().find(|c| c.conversation_id == conversation_id)
    }

    pub fn all_succeeded(&self) -> bool {
        self.skipped.is_empty() && self.conversations.iter().all(ConversationOutcome::is_success)
    }

    pub fn was_cancelled(&self) -> bool {
        self.conversations
            .iter()
            .any(|c| c.error().is_some_and(|e| e.kind() == ErrorKind::Cancelled))
    }

    pub fn total_records(&self) -> usize {
        self.conversations.iter().map(|c| c.records.len()).sum()
    }
}
