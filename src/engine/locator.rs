//! Named block location.
//!
//! A [`BlockLocator`] finds block headers by regex pattern and resolves
//! each header to a full [`Block`] span using the balanced-brace scanner.
//! One malformed block is skipped with a diagnostic rather than aborting
//! the scan, so siblings of a truncated block are still extracted.

use crate::engine::scanner::matching_brace;
use crate::engine::span::Span;
use crate::error::{Result, TfSculptError};
use regex::Regex;

/// How far past a header match to look for the opening brace.
const HEADER_LOOKAHEAD: usize = 80;

/// A named, brace-delimited unit of configuration text.
///
/// `span` covers the header through the closing brace inclusive;
/// `body_span` excludes the outer braces. Blocks are produced fresh per
/// scan and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Label identifying the block, taken from the header pattern's first
    /// capture group when present, otherwise the whole header match.
    pub label: String,
    /// Full extent including delimiters.
    pub span: Span,
    /// Extent of the body, excluding the outer braces.
    pub body_span: Span,
}

impl Block {
    /// The full block text in `buffer`.
    #[must_use]
    pub fn text<'t>(&self, buffer: &'t str) -> &'t str {
        self.span.slice(buffer)
    }

    /// The body text in `buffer`, without the outer braces.
    #[must_use]
    pub fn body<'t>(&self, buffer: &'t str) -> &'t str {
        self.body_span.slice(buffer)
    }
}

/// Finds blocks whose headers match a compiled pattern.
pub struct BlockLocator {
    pattern: Regex,
}

impl BlockLocator {
    /// Create a locator from an already-compiled header pattern.
    #[must_use]
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// Compile `pattern` and create a locator.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regex.
    pub fn for_header(pattern: &str) -> Result<Self> {
        let compiled = Regex::new(pattern).map_err(|e| TfSculptError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
            src_path: file!(),
            src_line: line!(),
        })?;
        Ok(Self::new(compiled))
    }

    /// Iterate over all blocks whose header matches the pattern.
    ///
    /// The sequence is finite and restartable: re-running the same scan
    /// over the same text yields the same blocks. A header with no opening
    /// brace within the lookahead window, or with an unterminated body, is
    /// skipped with a warning.
    pub fn find_blocks<'t>(&'t self, text: &'t str) -> impl Iterator<Item = Block> + 't {
        self.pattern.captures_iter(text).filter_map(move |caps| {
            let header = caps.get(0).expect("capture 0 always present");
            let label = caps
                .get(1)
                .map_or_else(|| header.as_str().to_string(), |m| m.as_str().to_string());

            let Some(open) = find_open_brace(text, header.end()) else {
                tracing::warn!(
                    label = %label,
                    offset = header.start(),
                    "block header has no opening brace within lookahead, skipping"
                );
                return None;
            };

            let Some(close) = matching_brace(text, open) else {
                tracing::warn!(
                    label = %label,
                    offset = header.start(),
                    "unterminated block, skipping"
                );
                return None;
            };

            Some(Block {
                label,
                span: Span::new(header.start(), close),
                body_span: Span::new(open + 1, close - 1),
            })
        })
    }

    /// The first matching block, if any.
    #[must_use]
    pub fn find_first(&self, text: &str) -> Option<Block> {
        self.find_blocks(text).next()
    }
}

/// Find the first unescaped `{` at or after `from`, within the lookahead
/// window. Header patterns often end just before the brace; some include
/// it, in which case `from` is already past it and the search must look
/// back one character first.
fn find_open_brace(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if from > 0 && bytes[from - 1] == b'{' {
        return Some(from - 1);
    }
    let limit = (from + HEADER_LOOKAHEAD).min(bytes.len());
    (from..limit).find(|&pos| bytes[pos] == b'{' && (pos == 0 || bytes[pos - 1] != b'\\'))
}
