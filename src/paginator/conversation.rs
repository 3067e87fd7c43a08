use tokio_util::sync::CancellationToken;

use super::ordering::sort_records;
use crate::fetcher::{Credential, FetchError, PageFetcher};
use crate::models::{ConversationOutcome, ConversationStatus, Cursor, MessageRecord, SortOrder};
use crate::parsers::normalize_items;

/// Per-conversation settings applied by the paginator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationOptions {
    pub order: SortOrder,
    /// Maximum page fetches for the conversation; 0 means unlimited.
    pub page_limit: u32,
}

/// Phase of a conversation's pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    Idle,
    Fetching,
    HasMore,
    Exhausted,
    Failed,
}

impl PaginationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed)
    }
}

/// Pagination progress for one conversation. Only [`ConversationPaginator`] mutates it.
#[derive(Debug, Clone)]
pub struct ConversationFetchState {
    conversation_id: String,
    cursor: Option<Cursor>,
    pages_fetched: u32,
    records: Vec<MessageRecord>,
    phase: PaginationState,
    reached_page_limit: bool,
    error: Option<FetchError>,
}

impl ConversationFetchState {
    fn new(conversation_id: String) -> Self {
        Self {
            conversation_id,
            cursor: None,
            pages_fetched: 0,
            records: Vec::new(),
            phase: PaginationState::Idle,
            reached_page_limit: false,
            error: None,
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Cursor of the next page to request; `None` before the first page.
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Records accumulated so far, in delivery order.
    pub fn records(&self) -> &[MessageRecord] {
        &self.records
    }

    pub fn phase(&self) -> PaginationState {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    fn fail(&mut self, error: FetchError) {
        self.phase = PaginationState::Failed;
        self.error = Some(error);
    }
}

/// Drives the page fetcher across cursors for a single conversation.
///
/// ```text
/// Idle -> Fetching -> HasMore -> Fetching -> ... -> Exhausted
///                  \-> Failed (error + records fetched so far)
/// ```
pub struct ConversationPaginator<'a> {
    fetcher: &'a PageFetcher,
    credential: &'a Credential,
    options: PaginationOptions,
    state: ConversationFetchState,
}

impl<'a> ConversationPaginator<'a> {
    pub fn new(
        fetcher: &'a PageFetcher,
        credential: &'a Credential,
        conversation_id: impl Into<String>,
        options: PaginationOptions,
    ) -> Self {
        Self {
            fetcher,
            credential,
            options,
            state: ConversationFetchState::new(conversation_id.into()),
        }
    }

    pub fn state(&self) -> &ConversationFetchState {
        &self.state
    }

    /// Fetch one page and apply the resulting transition. No-op once terminal.
    pub async fn advance(&mut self) -> PaginationState {
        if self.state.is_terminal() {
            return self.state.phase;
        }

        self.state.phase = PaginationState::Fetching;
        let result = self
            .fetcher
            .fetch(&self.state.conversation_id, self.state.cursor.as_ref(), self.credential)
            .await;

        match result {
            Ok(page) => {
                self.state.pages_fetched += 1;
                self.state.records.extend(normalize_items(page.items));

                match page.next_cursor {
                    None => self.state.phase = PaginationState::Exhausted,
                    Some(_) if self.limit_reached() => {
                        self.state.reached_page_limit = true;
                        self.state.phase = PaginationState::Exhausted;
                    }
                    Some(next) => {
                        self.state.cursor = Some(next);
                        self.state.phase = PaginationState::HasMore;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    conversation_id = %self.state.conversation_id,
                    pages_fetched = self.state.pages_fetched,
                    "pagination failed: {}",
                    e
                );
                self.state.fail(e);
            }
        }

        self.state.phase
    }

    /// Stop before the next page is requested.
    pub fn cancel(&mut self) {
        if !self.state.is_terminal() {
            self.state.fail(FetchError::Cancelled);
        }
    }

    /// Paginate until a terminal state, checking `cancel` before every page request.
    pub async fn run(mut self, cancel: &CancellationToken) -> ConversationOutcome {
        while !self.state.is_terminal() {
            if cancel.is_cancelled() {
                self.cancel();
                break;
            }
            self.advance().await;
        }
        self.into_outcome()
    }

    fn limit_reached(&self) -> bool {
        self.options.page_limit > 0 && self.state.pages_fetched >= self.options.page_limit
    }

    fn into_outcome(self) -> ConversationOutcome {
        let ConversationFetchState {
            conversation_id,
            pages_fetched,
            mut records,
            reached_page_limit,
            error,
            ..
        } = self.state;

        sort_records(&mut records, self.options.order);

        let status = match error {
            Some(e) => ConversationStatus::Failed(e),
            None => ConversationStatus::Exhausted { reached_page_limit },
        };
        tracing::info!(
            conversation_id = %conversation_id,
            pages_fetched,
            records = records.len(),
            "conversation finished"
        );

        ConversationOutcome { conversation_id, records, pages_fetched, status }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::fetcher::{PageRequest, RetryPolicy, Transport, TransportError};

    struct Scripted {
        responses: Mutex<VecDeque<Result<Value, TransportError>>>,
        seen_cursors: Mutex<Vec<Option<String>>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<Value, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                seen_cursors: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Value, TransportError> {
            self.seen_cursors
                .lock()
                .unwrap()
                .push(request.cursor.map(|c| c.as_str().to_string()));
            self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
                Ok(json!({"data": [], "paging": {"next": "endless"}}))
            })
        }
    }

    fn message(id: &str, minute: u32) -> Value {
        json!({"id": id, "created_time": format!("2024-01-15T10:{:02}:00+0000", minute)})
    }

    fn page(items: Vec<Value>, next: Option<&str>) -> Result<Value, TransportError> {
        match next {
            Some(next) => Ok(json!({"data": items, "paging": {"next": next}})),
            None => Ok(json!({"data": items})),
        }
    }

    #[tokio::test]
    async fn test_advance_walks_state_machine() {
        let transport = Scripted::new(vec![
            page(vec![message("a", 1)], Some("cursor-1")),
            page(vec![message("b", 2)], None),
        ]);
        let fetcher = PageFetcher::new(transport.clone()).with_retry(RetryPolicy::no_retry());
        let credential = Credential::new("t").unwrap();
        let mut paginator =
            ConversationPaginator::new(&fetcher, &credential, "c1", PaginationOptions::default());

        assert_eq!(paginator.state().phase(), PaginationState::Idle);
        assert_eq!(paginator.advance().await, PaginationState::HasMore);
        assert_eq!(paginator.state().cursor().unwrap().as_str(), "cursor-1");
        assert_eq!(paginator.advance().await, PaginationState::Exhausted);
        assert_eq!(paginator.state().pages_fetched(), 2);
        // Terminal: further calls do nothing
        assert_eq!(paginator.advance().await, PaginationState::Exhausted);
        assert_eq!(
            *transport.seen_cursors.lock().unwrap(),
            vec![None, Some("cursor-1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_records_accumulate_in_delivery_order() {
        let transport = Scripted::new(vec![
            page(vec![message("A", 32), message("B", 30)], Some("cursor-1")),
            page(vec![message("C", 31)], None),
        ]);
        let fetcher = PageFetcher::new(transport).with_retry(RetryPolicy::no_retry());
        let credential = Credential::new("t").unwrap();
        let mut paginator =
            ConversationPaginator::new(&fetcher, &credential, "c1", PaginationOptions::default());

        paginator.advance().await;
        paginator.advance().await;

        let ids: Vec<&str> = paginator.state().records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);

        let sorted: Vec<String> = paginator
            .run(&CancellationToken::new())
            .await
            .records
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(sorted, vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn test_page_limit_marks_reached() {
        let transport = Scripted::new(vec![]);
        let fetcher = PageFetcher::new(transport.clone()).with_retry(RetryPolicy::no_retry());
        let credential = Credential::new("t").unwrap();
        let options = PaginationOptions { order: SortOrder::Ascending, page_limit: 3 };
        let outcome = ConversationPaginator::new(&fetcher, &credential, "c1", options)
            .run(&CancellationToken::new())
            .await;

        assert_eq!(outcome.pages_fetched, 3);
        assert!(outcome.reached_page_limit());
        assert_eq!(transport.seen_cursors.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_cancel_before_start_yields_cancelled_failure() {
        let transport = Scripted::new(vec![]);
        let fetcher = PageFetcher::new(transport.clone());
        let credential = Credential::new("t").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome =
            ConversationPaginator::new(&fetcher, &credential, "c1", PaginationOptions::default())
                .run(&cancel)
                .await;
        assert_eq!(outcome.error(), Some(&FetchError::Cancelled));
        assert_eq!(outcome.pages_fetched, 0);
        assert!(transport.seen_cursors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_partial_records() {
        let transport = Scripted::new(vec![
            page(vec![message("a", 1), message("b", 2)], Some("cursor-1")),
            Err(TransportError::Status { status: 404, body: String::new() }),
        ]);
        let fetcher = PageFetcher::new(transport.clone()).with_retry(RetryPolicy::no_retry());
        let credential = Credential::new("t").unwrap();
        let mut paginator =
            ConversationPaginator::new(&fetcher, &credential, "c1", PaginationOptions::default());

        paginator.advance().await;
        assert_eq!(paginator.advance().await, PaginationState::Failed);
        assert_eq!(paginator.state().records().len(), 2);
        assert!(matches!(paginator.state().error(), Some(FetchError::NotFound { .. })));
    }
}
