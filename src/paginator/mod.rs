//! Cursor-driven pagination over a single conversation.
//!
//! [`ConversationPaginator`] walks every page for batch output and ends in a terminal
//! state. [`ConversationPager`] serves the interactive browser one cached page at a time.
//!
//! # Error Handling Strategy
//!
//! Neither type retries on its own; retries belong to the page fetcher. The paginator
//! folds a [`FetchError`](crate::fetcher::FetchError) into its `Failed` state together
//! with the records gathered so far. The pager hands errors back to the caller and
//! leaves its cache untouched so the same cursor can be tried again.

pub mod conversation;
pub mod ordering;
pub mod pager;

pub use conversation::{
    ConversationFetchState, ConversationPaginator, PaginationOptions, PaginationState,
};
pub use ordering::sort_records;
pub use pager::{BrowsePage, ConversationPager};
