//! Decoders for Graph API message pages
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach at the item level and a strict
//! one at the page level:
//!
//! - **Individual message failures**: Items without a usable `id` or `created_time` are
//!   dropped and logged at debug level. A single odd item never fails its page.
//!
//! - **Optional fields**: Sender, recipients and text are read leniently. Unexpected
//!   shapes leave the field absent instead of dropping the message.
//!
//! - **Page schema failures**: A body that is not an object, or whose `data` member is
//!   not an array, yields a [`PageDecodeError`]. The fetcher treats that as a malformed
//!   response and retries it like a transient failure.
//!
//! Untyped JSON stops here: everything downstream works with
//! [`MessageRecord`](crate::models::MessageRecord).

pub mod deserializers;
pub mod message;
pub mod page;

pub use message::{normalize_items, normalize_message};
pub use page::{PageDecodeError, decode_page};
