use std::collections::HashMap;
use std::sync::Arc;

use super::ordering::sort_records;
use crate::fetcher::{Credential, FetchError, PageFetcher};
use crate::models::{Cursor, MessageRecord, SortOrder};
use crate::parsers::normalize_items;

/// One page as shown by the interactive browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowsePage {
    /// Cursor this page was requested with; `None` for the first page.
    pub cursor: Option<Cursor>,
    /// Records of this page only, sorted by the pager's order.
    pub records: Vec<MessageRecord>,
    pub next_cursor: Option<Cursor>,
    pub previous_cursor: Option<Cursor>,
}

/// Page-at-a-time access to one conversation, caching pages by cursor.
///
/// Revisiting a cached cursor never costs a request and never counts against the page
/// limit. Errors are returned to the caller and not cached, so a retry is possible.
pub struct ConversationPager {
    fetcher: Arc<PageFetcher>,
    credential: Credential,
    conversation_id: String,
    order: SortOrder,
    page_limit: u32,
    cache: HashMap<Option<Cursor>, Arc<BrowsePage>>,
    fetched: u32,
}

impl ConversationPager {
    pub fn new(
        fetcher: Arc<PageFetcher>,
        credential: Credential,
        conversation_id: impl Into<String>,
        order: SortOrder,
        page_limit: u32,
    ) -> Self {
        Self {
            fetcher,
            credential,
            conversation_id: conversation_id.into(),
            order,
            page_limit,
            cache: HashMap::new(),
            fetched: 0,
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Number of pages requested from the API so far.
    pub fn pages_fetched(&self) -> u32 {
        self.fetched
    }

    pub fn is_cached(&self, cursor: Option<&Cursor>) -> bool {
        self.cache.contains_key(&cursor.cloned())
    }

    /// Return the page at `cursor`, fetching it if needed.
    ///
    /// `Ok(None)` means the page limit is used up and the page is not cached.
    pub async fn fetch_page(
        &mut self,
        cursor: Option<&Cursor>,
    ) -> Result<Option<Arc<BrowsePage>>, FetchError> {
        let key = cursor.cloned();
        if let Some(page) = self.cache.get(&key) {
            return Ok(Some(Arc::clone(page)));
        }
        if self.page_limit > 0 && self.fetched >= self.page_limit {
            tracing::debug!(
                conversation_id = %self.conversation_id,
                page_limit = self.page_limit,
                "page limit reached"
            );
            return Ok(None);
        }

        let result = self.fetcher.fetch(&self.conversation_id, cursor, &self.credential).await?;
        self.fetched += 1;

        let mut records = normalize_items(result.items);
        sort_records(&mut records, self.order);
        let page = Arc::new(BrowsePage {
            cursor: key.clone(),
            records,
            next_cursor: result.next_cursor,
            previous_cursor: result.previous_cursor,
        });
        self.cache.insert(key, Arc::clone(&page));
        Ok(Some(page))
    }
}
