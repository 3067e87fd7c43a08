//! Terminal output sanitization
//!
//! # Security: Terminal Injection Prevention
//!
//! Message text and usernames come from other people's accounts. Anything printed to a
//! terminal or drawn in the TUI goes through [`strip_ansi_codes`] first so that escape
//! sequences embedded in a message cannot clear the screen, move the cursor or retitle
//! the window.

/// Strips ANSI escape sequences and control characters from a string.
///
/// Removes CSI sequences (`ESC [ ... letter`), OSC sequences (`ESC ] ... BEL` or
/// `ESC ] ... ESC \`) and every control character other than tab, newline and
/// carriage return.
///
/// # Examples
///
/// ```
/// use ig_message_explorer::utils::terminal::strip_ansi_codes;
///
/// let text = "\x1b[31mRed text\x1b[0m";
/// assert_eq!(strip_ansi_codes(text), "Red text");
/// ```
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    for next_ch in chars.by_ref() {
                        if next_ch.is_ascii_alphabetic() {
                            break;
                        }
                    }
                    continue;
                }
                Some(']') => {
                    chars.next();
                    while let Some(next_ch) = chars.next() {
                        if next_ch == '\x07' {
                            break;
                        }
                        if next_ch == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                    continue;
                }
                _ => {}
            }
        }

        if ch.is_control() && ch != '\t' && ch != '\n' && ch != '\r' {
            continue;
        }

        result.push(ch);
    }

    result
}

/// Sanitize text for a single-line cell: strips escapes and folds line breaks and
/// tabs into single spaces.
pub fn sanitize_line(text: &str) -> String {
    strip_ansi_codes(text).split_whitespace().collect::<Vec<_>>().join(" ")
}
