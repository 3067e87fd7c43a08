//! Data models for conversation message histories.
//!
//! This module defines the data structures shared by the fetch engine and its consumers:
//!
//! - [`MessageRecord`] - One normalized message extracted from an API payload
//! - [`Cursor`] / [`PageResult`] - One page of raw items plus its paging tokens
//! - [`SortOrder`] - Ordering direction applied to accumulated records
//! - [`ConversationOutcome`] / [`FetchOutcome`] - Terminal per-conversation and aggregate results
//!
//! Raw API items only ever appear wrapped in [`RawMessage`]; the normalizer in
//! `parsers::message` is the single place that turns them into typed records.

pub mod message;
pub mod order;
pub mod outcome;
pub mod page;

pub use message::MessageRecord;
pub use order::SortOrder;
pub use outcome::{ConversationOutcome, ConversationStatus, FetchOutcome};
pub use page::{Cursor, PageResult, RawMessage};
