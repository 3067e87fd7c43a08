//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ig_message_explorer::fetcher::{PageFetcher, PageRequest, RetryPolicy, Transport, TransportError};
use serde_json::{Value, json};

type Key = (String, Option<String>);

/// In-memory [`Transport`] that answers by conversation ID and cursor.
///
/// Each route holds a queue of responses; the last one repeats once the queue is down
/// to a single entry. Unrouted requests answer with a 404.
#[derive(Default)]
pub struct RoutedTransport {
    routes: Mutex<HashMap<Key, VecDeque<Result<Value, TransportError>>>>,
    calls: Mutex<Vec<Key>>,
}

impl RoutedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the page of `conversation_id` at `cursor`
    pub fn route(
        self,
        conversation_id: &str,
        cursor: Option<&str>,
        response: Result<Value, TransportError>,
    ) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry((conversation_id.to_string(), cursor.map(str::to_string)))
            .or_default()
            .push_back(response);
        self
    }

    pub fn page(self, conversation_id: &str, cursor: Option<&str>, body: Value) -> Self {
        self.route(conversation_id, cursor, Ok(body))
    }

    pub fn fail(self, conversation_id: &str, cursor: Option<&str>, status: u16, body: &str) -> Self {
        self.route(
            conversation_id,
            cursor,
            Err(TransportError::Status { status, body: body.to_string() }),
        )
    }

    /// Every request seen so far, in arrival order
    pub fn calls(&self) -> Vec<Key> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, conversation_id: &str) -> usize {
        self.calls().iter().filter(|(id, _)| id == conversation_id).count()
    }
}

#[async_trait]
impl Transport for RoutedTransport {
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Value, TransportError> {
        let key = (
            request.conversation_id.to_string(),
            request.cursor.map(|c| c.as_str().to_string()),
        );
        self.calls.lock().unwrap().push(key.clone());

        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap(),
            None => Err(TransportError::Status { status: 404, body: String::new() }),
        }
    }
}

/// Fetcher over `transport` with instant retries
pub fn fetcher(transport: Arc<RoutedTransport>, max_attempts: u32) -> Arc<PageFetcher> {
    Arc::new(
        PageFetcher::new(transport)
            .with_retry(RetryPolicy::immediate(max_attempts))
            .with_request_timeout(Duration::from_secs(5)),
    )
}

/// A Graph API message item
pub fn message(id: &str, created_time: &str, sender: &str, text: &str) -> Value {
    json!({
        "id": id,
        "created_time": created_time,
        "from": { "username": sender, "id": format!("{}-id", sender) },
        "to": { "data": [{ "id": "page-id" }] },
        "message": text,
    })
}

/// A page body with an optional `paging.next` cursor
pub fn page(items: Vec<Value>, next: Option<&str>) -> Value {
    match next {
        Some(next) => json!({ "data": items, "paging": { "next": next } }),
        None => json!({ "data": items }),
    }
}

/// Graph API error body for an invalid access token
pub fn oauth_error() -> &'static str {
    r#"{"error":{"message":"Invalid OAuth access token.","type":"OAuthException","code":190}}"#
}
