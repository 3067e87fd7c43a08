use std::sync::Arc;
use std::time::Duration;

use super::error::FailureClass;
use super::{Credential, FetchError, PageRequest, RetryPolicy, Transport};
use crate::models::{Cursor, PageResult};
use crate::parsers::decode_page;

/// Default number of messages requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 25;
/// Default timeout for a single page request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Performs one logical page fetch: a bounded series of transport attempts, each with
/// its own timeout, ending in a decoded [`PageResult`] or a classified [`FetchError`].
pub struct PageFetcher {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    request_timeout: Duration,
    page_size: u32,
}

impl PageFetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = RetryPolicy { max_attempts: retry.max_attempts.max(1), ..retry };
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetch the page at `cursor` (or the first page) for `conversation_id`.
    ///
    /// Auth and not-found failures return immediately. Transient and malformed-response
    /// failures are retried up to `max_attempts` total attempts.
    pub async fn fetch(
        &self,
        conversation_id: &str,
        cursor: Option<&Cursor>,
        credential: &Credential,
    ) -> Result<PageResult, FetchError> {
        let request =
            PageRequest { conversation_id, cursor, credential, page_size: self.page_size };
        let mut attempt = 0;

        loop {
            attempt += 1;
            let failure = match tokio::time::timeout(
                self.request_timeout,
                self.transport.fetch_page(&request),
            )
            .await
            {
                Err(_) => FailureClass::Transient(format!(
                    "request timed out after {:?}",
                    self.request_timeout
                )),
                Ok(Err(e)) => e.classify(),
                Ok(Ok(body)) => match decode_page(body) {
                    Ok(page) => {
                        tracing::debug!(
                            conversation_id,
                            attempt,
                            items = page.items.len(),
                            has_next = !page.is_last(),
                            "fetched page"
                        );
                        return Ok(page);
                    }
                    Err(e) => FailureClass::Malformed(e.to_string()),
                },
            };

            let (message, malformed) = match failure {
                FailureClass::Auth(message) => return Err(FetchError::Auth { message }),
                FailureClass::NotFound(message) => return Err(FetchError::NotFound { message }),
                FailureClass::Transient(message) => (message, false),
                FailureClass::Malformed(message) => (message, true),
            };

            if attempt >= self.retry.max_attempts {
                return Err(if malformed {
                    FetchError::MalformedResponse { attempts: attempt, message }
                } else {
                    FetchError::TransientExhausted { attempts: attempt, message }
                });
            }

            let delay = self.retry.delay_for(attempt);
            tracing::warn!(
                conversation_id,
                attempt,
                max_attempts = self.retry.max_attempts,
                "page fetch failed: {}; retrying in {:?}",
                message,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}
