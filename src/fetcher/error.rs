use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Graph API error code for an invalid or expired access token
const OAUTH_INVALID_TOKEN_CODE: i64 = 190;
/// Graph API throttling codes (app, user, page and API-level rate limits)
const RATE_LIMIT_CODES: [i64; 4] = [4, 17, 32, 613];

/// Failure reported by a [`Transport`](super::Transport) for one request attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response body is not valid JSON: {0}")]
    Decode(String),
    #[error("refusing to follow cursor to a different origin: {0}")]
    ForeignCursor(String),
}

/// Retry classification of a single failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FailureClass {
    Auth(String),
    NotFound(String),
    Transient(String),
    Malformed(String),
}

impl TransportError {
    pub(crate) fn classify(&self) -> FailureClass {
        match self {
            Self::Network(_) | Self::Timeout => FailureClass::Transient(self.to_string()),
            Self::Decode(_) | Self::ForeignCursor(_) => FailureClass::Malformed(self.to_string()),
            Self::Status { status, body } => classify_status(*status, body),
        }
    }
}

/// Map an HTTP error status (and its Graph API error body, if any) to a failure class.
fn classify_status(status: u16, body: &str) -> FailureClass {
    let (code, message) = graph_error(body);
    let detail = match message {
        Some(msg) => format!("HTTP {}: {}", status, msg),
        None => format!("HTTP {}", status),
    };

    if status == 401 || code == Some(OAUTH_INVALID_TOKEN_CODE) {
        return FailureClass::Auth(detail);
    }
    if status == 408 || status == 429 || status >= 500 {
        return FailureClass::Transient(detail);
    }
    if code.is_some_and(|c| RATE_LIMIT_CODES.contains(&c)) {
        return FailureClass::Transient(detail);
    }
    FailureClass::NotFound(detail)
}

/// Extract `error.code` and `error.message` from a Graph API error body
fn graph_error(body: &str) -> (Option<i64>, Option<String>) {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return (None, None);
    };
    let error = value.get("error");
    let code = error.and_then(|e| e.get("code")).and_then(Value::as_i64);
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string);
    (code, message)
}

/// Stable classification of a conversation-level failure, used by presenters and the
/// JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AuthError,
    NotFound,
    TransientExhausted,
    MalformedResponse,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthError => "auth_error",
            Self::NotFound => "not_found",
            Self::TransientExhausted => "transient_exhausted",
            Self::MalformedResponse => "malformed_response",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal error of a page fetch, after retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The credential was rejected. Fatal for the whole run.
    #[error("access token rejected ({message})")]
    Auth { message: String },
    /// The conversation does not exist or is not accessible with this credential.
    #[error("conversation not found or inaccessible ({message})")]
    NotFound { message: String },
    #[error("giving up after {attempts} attempt(s): {message}")]
    TransientExhausted { attempts: u32, message: String },
    #[error("malformed response after {attempts} attempt(s): {message}")]
    MalformedResponse { attempts: u32, message: String },
    #[error("cancelled before the next page was requested")]
    Cancelled,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth { .. } => ErrorKind::AuthError,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::TransientExhausted { .. } => ErrorKind::TransientExhausted,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// An error after which no other conversation can succeed either.
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}
