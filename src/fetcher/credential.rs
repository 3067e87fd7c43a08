use std::fmt;

use crate::utils::normalize_token;

/// Bearer access token passed explicitly to every page request.
///
/// `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Build a credential from user input, trimming whitespace and surrounding quotes.
    /// Returns `None` if nothing is left.
    pub fn new(raw: &str) -> Option<Self> {
        let token = normalize_token(raw);
        if token.is_empty() { None } else { Some(Self(token)) }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
