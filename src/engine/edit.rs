//! Ordered multi-edit application.
//!
//! Analysis passes gather spans first and rewrite later. An [`EditSet`]
//! collects the planned replacements against one buffer and applies them
//! in a single pass, in descending start order, so applying one edit never
//! shifts the offsets of edits still pending. Overlapping edits are a
//! caller bug and are rejected before any splicing happens.

use crate::engine::span::Span;
use crate::error::{Result, TfSculptError};

/// A planned replacement of one span's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// The span to replace. Must be non-empty.
    pub span: Span,
    /// The replacement text.
    pub replacement: String,
}

impl Edit {
    /// Create a new edit.
    #[must_use]
    pub fn new(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }
}

/// A set of edits bound to a single text buffer.
///
/// The set never mutates after `apply`; re-applying to the original
/// buffer always yields the same result.
#[derive(Debug, Default, Clone)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    /// Create an empty edit set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edit. An empty span denotes a failed extraction and is
    /// dropped rather than applied.
    pub fn push(&mut self, edit: Edit) {
        if edit.span.is_empty() {
            tracing::debug!(offset = edit.span.start, "dropping empty-span edit");
            return;
        }
        self.edits.push(edit);
    }

    /// Add a replacement for `span`.
    pub fn replace(&mut self, span: Span, replacement: impl Into<String>) {
        self.push(Edit::new(span, replacement));
    }

    /// Number of pending edits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Whether the set holds no edits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply all edits to `buffer` and return the rewritten text.
    ///
    /// Edits are validated for pairwise non-overlap first, then applied in
    /// descending start order. Applying in any other order would corrupt
    /// every edit after the first, since each splice shifts all following
    /// offsets.
    ///
    /// # Errors
    ///
    /// Returns `OverlappingEdits` without touching the buffer if any two
    /// spans overlap — application is all-or-nothing.
    pub fn apply(&self, buffer: &str) -> Result<String> {
        let mut ordered: Vec<&Edit> = self.edits.iter().collect();
        ordered.sort_by_key(|e| e.span.start);

        for pair in ordered.windows(2) {
            if pair[0].span.overlaps(&pair[1].span) {
                return Err(TfSculptError::OverlappingEdits {
                    first: format!("{}..{}", pair[0].span.start, pair[0].span.end),
                    second: format!("{}..{}", pair[1].span.start, pair[1].span.end),
                    src_path: file!(),
                    src_line: line!(),
                });
            }
        }

        let mut out = buffer.to_string();
        for edit in ordered.iter().rev() {
            out.replace_range(edit.span.start..edit.span.end, &edit.replacement);
        }

        tracing::debug!(edits = ordered.len(), "edit set applied");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_edit() {
        let buffer = "hostname = \"example.com\"";
        let mut edits = EditSet::new();
        edits.replace(Span::new(11, 24), "var.hostname");

        assert_eq!(edits.apply(buffer).unwrap(), "hostname = var.hostname");
    }

    #[test]
    fn test_multiple_edits_no_drift() {
        //            0123456789012345
        let buffer = "aaa bbb ccc ddd";
        let mut edits = EditSet::new();
        // Pushed in ascending order; application order must not matter
        edits.replace(Span::new(0, 3), "first_long_replacement");
        edits.replace(Span::new(8, 11), "X");

        assert_eq!(
            edits.apply(buffer).unwrap(),
            "first_long_replacement bbb X ddd"
        );
    }

    #[test]
    fn test_idempotent_over_original_buffer() {
        let buffer = "one two three";
        let mut edits = EditSet::new();
        edits.replace(Span::new(0, 3), "1");
        edits.replace(Span::new(4, 7), "2");

        let a = edits.apply(buffer).unwrap();
        let b = edits.apply(buffer).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "1 2 three");
    }

    #[test]
    fn test_round_trip_restores_original() {
        let buffer = "origin { hostname = \"example.com\" port = 8080 }";

        let mut forward = EditSet::new();
        forward.replace(Span::new(21, 32), "SENTINEL_A");
        forward.replace(Span::new(41, 45), "SENTINEL_B");
        let sentineled = forward.apply(buffer).unwrap();

        let a_start = sentineled.find("SENTINEL_A").unwrap();
        let b_start = sentineled.find("SENTINEL_B").unwrap();
        let mut backward = EditSet::new();
        backward.replace(Span::new(a_start, a_start + 10), "example.com");
        backward.replace(Span::new(b_start, b_start + 10), "8080");

        assert_eq!(backward.apply(&sentineled).unwrap(), buffer);
    }

    #[test]
    fn test_overlapping_edits_rejected() {
        let buffer = "abcdefgh";
        let mut edits = EditSet::new();
        edits.replace(Span::new(0, 4), "x");
        edits.replace(Span::new(2, 6), "y");

        let err = edits.apply(buffer).unwrap_err();
        assert!(matches!(err, TfSculptError::OverlappingEdits { .. }));
    }

    #[test]
    fn test_rejection_happens_before_any_splice() {
        let buffer = "abcdefgh";
        let mut edits = EditSet::new();
        edits.replace(Span::new(6, 8), "tail");
        edits.replace(Span::new(0, 4), "x");
        edits.replace(Span::new(2, 6), "y");

        // Even though the tail edit is disjoint, nothing is applied
        assert!(edits.apply(buffer).is_err());
        assert_eq!(buffer, "abcdefgh");
    }

    #[test]
    fn test_touching_spans_are_not_overlapping() {
        let buffer = "abcd";
        let mut edits = EditSet::new();
        edits.replace(Span::new(0, 2), "x");
        edits.replace(Span::new(2, 4), "y");

        assert_eq!(edits.apply(buffer).unwrap(), "xy");
    }

    #[test]
    fn test_empty_span_dropped() {
        let buffer = "abcd";
        let mut edits = EditSet::new();
        edits.replace(Span::empty(2), "never");

        assert!(edits.is_empty());
        assert_eq!(edits.apply(buffer).unwrap(), "abcd");
    }
}
