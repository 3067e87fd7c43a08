//! Runs one paginator per requested conversation and assembles a [`FetchOutcome`].
//!
//! # Error Handling Strategy
//!
//! Conversations fail independently: a conversation's error is recorded in its own
//! outcome and the run moves on. The one exception is a run-fatal error (the token was
//! rejected). Once seen, conversations that have not started yet are skipped and listed
//! in [`FetchOutcome::skipped`]. Conversations already in flight finish normally.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use tokio_util::sync::CancellationToken;

use crate::fetcher::{Credential, PageFetcher};
use crate::models::{ConversationOutcome, FetchOutcome};
use crate::paginator::{ConversationPaginator, PaginationOptions};

enum Slot {
    Done(ConversationOutcome),
    Skipped(String),
}

/// Multi-conversation driver with bounded concurrency.
///
/// Results are always assembled in input order, whatever order conversations finish in.
pub struct Coordinator {
    fetcher: Arc<PageFetcher>,
    options: PaginationOptions,
    concurrency: usize,
}

impl Coordinator {
    pub fn new(fetcher: Arc<PageFetcher>, options: PaginationOptions) -> Self {
        Self { fetcher, options, concurrency: 1 }
    }

    /// Number of conversations paginated at once (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn run(
        &self,
        conversation_ids: &[String],
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> FetchOutcome {
        self.run_with_progress(conversation_ids, credential, cancel, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_outcome` for each conversation in input
    /// order as soon as its outcome and every earlier one are available.
    pub async fn run_with_progress<F>(
        &self,
        conversation_ids: &[String],
        credential: &Credential,
        cancel: &CancellationToken,
        mut on_outcome: F,
    ) -> FetchOutcome
    where
        F: FnMut(&ConversationOutcome),
    {
        let auth_abort = CancellationToken::new();
        let fetcher = self.fetcher.as_ref();
        let options = self.options;

        let mut slots = stream::iter(conversation_ids.iter().cloned())
            .map(|conversation_id| {
                let auth_abort = &auth_abort;
                async move {
                    if auth_abort.is_cancelled() {
                        return Slot::Skipped(conversation_id);
                    }
                    let outcome =
                        ConversationPaginator::new(fetcher, credential, conversation_id, options)
                            .run(cancel)
                            .await;
                    if outcome.error().is_some_and(|e| e.is_run_fatal()) {
                        auth_abort.cancel();
                    }
                    Slot::Done(outcome)
                }
            })
            .buffered(self.concurrency);

        let mut conversations = Vec::with_capacity(conversation_ids.len());
        let mut skipped = Vec::new();
        while let Some(slot) = slots.next().await {
            match slot {
                Slot::Done(outcome) => {
                    on_outcome(&outcome);
                    conversations.push(outcome);
                }
                Slot::Skipped(conversation_id) => {
                    tracing::warn!(
                        conversation_id = %conversation_id,
                        "skipped: access token was rejected earlier in the run"
                    );
                    skipped.push(conversation_id);
                }
            }
        }

        FetchOutcome::new(conversations, skipped)
    }
}
