//! Instagram Message Explorer - Fetch and browse Instagram direct message conversations
//!
//! This library talks to the Instagram Graph API conversation messages endpoint. It
//! supports:
//!
//! - Fetching message pages with cursor pagination, per-request timeouts and retries
//! - Normalizing loosely shaped API items into [`MessageRecord`]s
//! - Fetching many conversations concurrently while keeping results in input order
//! - Text, raw and JSON output, and an interactive terminal browser
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use ig_message_explorer::fetcher::{Credential, HttpTransport, PageFetcher};
//! use ig_message_explorer::{Coordinator, PaginationOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let transport = HttpTransport::new(
//!     ig_message_explorer::fetcher::http::DEFAULT_API_BASE,
//!     ig_message_explorer::fetcher::http::DEFAULT_MESSAGE_FIELDS,
//!     Duration::from_secs(30),
//! )?;
//! let fetcher = Arc::new(PageFetcher::new(Arc::new(transport)));
//! let credential = Credential::new("EAAB...").expect("token");
//!
//! let outcome = Coordinator::new(fetcher, PaginationOptions::default())
//!     .run(&["1234567890".to_string()], &credential, &CancellationToken::new())
//!     .await;
//! println!("Fetched {} messages", outcome.total_records());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod coordinator;
pub mod fetcher;
pub mod models;
pub mod output;
pub mod paginator;
pub mod parsers;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use coordinator::Coordinator;
pub use fetcher::{Credential, FetchError, PageFetcher};
pub use models::{ConversationOutcome, FetchOutcome, MessageRecord, SortOrder};
pub use paginator::{ConversationPaginator, PaginationOptions};
