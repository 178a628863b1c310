//! Balanced-delimiter block scanning.
//!
//! The scanner is the foundation of the rewriting engine: given an offset
//! at (or just before) an opening brace, it walks the text with an explicit
//! state machine and returns the offset one past the matching closing
//! brace. Braces inside quoted strings and `#` line comments do not affect
//! the balance, so arbitrary HCL expression content inside a block never
//! perturbs the result.

/// Locate the matching closing brace for the block opening at or after
/// `open_offset`.
///
/// Scans forward maintaining an open-brace count; an unescaped `"` toggles
/// the in-string state (a character is escaped when immediately preceded by
/// a backslash), and while inside a string or a `#` line comment braces are
/// ignored. Returns the offset one past the closing brace once the count
/// returns to zero, or `None` when the input ends first (a truncated or
/// malformed block).
#[must_use]
pub fn matching_brace(text: &str, open_offset: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth: usize = 0;
    let mut seen_open = false;
    let mut in_quotes = false;
    let mut in_comment = false;

    let mut pos = open_offset;
    while pos < bytes.len() {
        let ch = bytes[pos];
        let escaped = pos > 0 && bytes[pos - 1] == b'\\';

        if in_comment {
            if ch == b'\n' {
                in_comment = false;
            }
            pos += 1;
            continue;
        }

        if ch == b'"' && !escaped {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            match ch {
                b'#' => in_comment = true,
                b'{' if !escaped => {
                    depth += 1;
                    seen_open = true;
                }
                b'}' if !escaped => {
                    // A closer before any opener means the caller's offset
                    // was past the block; treat as malformed.
                    if depth == 0 {
                        return None;
                    }
                    depth -= 1;
                    if depth == 0 && seen_open {
                        return Some(pos + 1);
                    }
                }
                _ => {}
            }
        }

        pos += 1;
    }

    None
}
