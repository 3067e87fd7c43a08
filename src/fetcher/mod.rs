//! Page fetching against the Graph API messages edge.
//!
//! # Error Handling Strategy
//!
//! Every request attempt ends in one of four classes:
//!
//! - **Auth**: the token was rejected (HTTP 401 or Graph error code 190). Returned at
//!   once; the coordinator aborts the rest of the run.
//! - **Not found**: any other client error. Returned at once; only this conversation fails.
//! - **Transient**: network errors, timeouts, 408/429/5xx and Graph throttling codes.
//!   Retried with bounded exponential backoff.
//! - **Malformed**: a body that is not JSON or not a page. Retried like a transient
//!   failure and reported as malformed once attempts run out.
//!
//! The [`Transport`] trait is the seam under all of this; [`HttpTransport`] is the
//! production implementation.

pub mod credential;
pub mod error;
pub mod http;
pub mod page_fetcher;
pub mod retry;
pub mod transport;

pub use credential::Credential;
pub use error::{ErrorKind, FetchError, TransportError};
pub use http::HttpTransport;
pub use page_fetcher::PageFetcher;
pub use retry::RetryPolicy;
pub use transport::{PageRequest, Transport};
