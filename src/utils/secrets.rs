/// Normalize an access token typed or pasted by a user.
///
/// Trims whitespace and strips surrounding ASCII or typographic quotes, which shells
/// and chat clients tend to leave around copied tokens.
pub fn normalize_token(raw: &str) -> String {
    fn is_quote(c: char) -> bool {
        matches!(c, '"' | '\'' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}')
    }

    raw.trim().trim_matches(is_quote).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_token_trims_and_unquotes() {
        assert_eq!(normalize_token("  IGQVJ123  "), "IGQVJ123");
        assert_eq!(normalize_token("\"IGQVJ123\""), "IGQVJ123");
        assert_eq!(normalize_token("'IGQVJ123'"), "IGQVJ123");
        assert_eq!(normalize_token("\u{201C}IGQVJ123\u{201D}"), "IGQVJ123");
        assert_eq!(normalize_token("\" IGQVJ123 \"\n"), "IGQVJ123");
    }

    #[test]
    fn test_normalize_token_empty_inputs() {
        assert_eq!(normalize_token(""), "");
        assert_eq!(normalize_token("   "), "");
        assert_eq!(normalize_token("\"\""), "");
    }

    #[test]
    fn test_normalize_token_keeps_inner_quotes() {
        assert_eq!(normalize_token("ab\"cd"), "ab\"cd");
    }
}
