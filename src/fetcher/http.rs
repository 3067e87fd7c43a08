use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Client, Url};
use serde_json::Value;

use super::{PageRequest, Transport, TransportError};

/// Default Graph API base, including the API version
pub const DEFAULT_API_BASE: &str = "https://graph.instagram.com/v22.0";
/// Fields requested for each message
pub const DEFAULT_MESSAGE_FIELDS: &str = "id,from,to,message,created_time";

// Characters that must be escaped inside a single URL path segment
const PATH_SEGMENT_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\');

/// reqwest-backed [`Transport`] for the Graph API messages edge.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    api_base: Url,
    fields: String,
}

impl HttpTransport {
    pub fn new(api_base: &str, fields: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let api_base = Url::parse(api_base.trim_end_matches('/'))
            .with_context(|| format!("Invalid API base URL: {}", api_base))?;
        if !matches!(api_base.scheme(), "http" | "https") {
            anyhow::bail!("API base URL must use http or https: {}", api_base);
        }
        let client = Client::builder()
            .pool_max_idle_per_host(8)
            .timeout(request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, api_base, fields: fields.into() })
    }

    /// URL for a page request.
    ///
    /// Absolute cursors (Graph API `paging.next` URLs) are followed as-is, but only on the
    /// API base's origin so the bearer token never leaves it.
    pub fn request_url(&self, request: &PageRequest<'_>) -> Result<Url, TransportError> {
        if let Some(cursor) = request.cursor
            && (cursor.as_str().starts_with("https://") || cursor.as_str().starts_with("http://"))
        {
            let url = Url::parse(cursor.as_str())
                .map_err(|e| TransportError::Decode(format!("invalid cursor URL: {}", e)))?;
            if url.origin() != self.api_base.origin() {
                return Err(TransportError::ForeignCursor(url.origin().ascii_serialization()));
            }
            return Ok(url);
        }

        let encoded_id = utf8_percent_encode(request.conversation_id, PATH_SEGMENT_SET);
        let mut url = Url::parse(&format!(
            "{}/{}/messages",
            self.api_base.as_str().trim_end_matches('/'),
            encoded_id
        ))
        .map_err(|e| TransportError::Network(format!("invalid request URL: {}", e)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("fields", &self.fields);
            query.append_pair("limit", &request.page_size.to_string());
            if let Some(cursor) = request.cursor {
                query.append_pair("after", cursor.as_str());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Value, TransportError> {
        let url = self.request_url(request)?;
        tracing::debug!(conversation_id = request.conversation_id, %url, "GET page");

        let resp = self
            .client
            .get(url)
            .bearer_auth(request.credential.expose())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status { status: status.as_u16(), body });
        }

        let bytes = resp.bytes().await.map_err(|e| TransportError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
