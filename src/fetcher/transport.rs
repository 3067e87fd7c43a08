use async_trait::async_trait;
use serde_json::Value;

use super::{Credential, TransportError};
use crate::models::Cursor;

/// Parameters of one page request.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub conversation_id: &'a str,
    /// `None` requests the first page.
    pub cursor: Option<&'a Cursor>,
    pub credential: &'a Credential,
    pub page_size: u32,
}

/// Raw request/response seam below the page fetcher.
///
/// Implementations perform exactly one request per call and report failures without
/// retrying; retries, timeouts and classification belong to
/// [`PageFetcher`](super::PageFetcher).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Value, TransportError>;
}
