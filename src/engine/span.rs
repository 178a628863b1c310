//! Half-open offset ranges into a text buffer.

use serde::Serialize;

/// A half-open byte range `[start, end)` into a specific text buffer.
///
/// Spans are produced by the scanning and extraction passes and consumed
/// by [`crate::engine::EditSet`] when rewriting. A span with
/// `start == end` denotes a failed/absent extraction and is never applied
/// as an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    /// Byte offset of the first character covered.
    pub start: usize,
    /// Byte offset one past the last character covered.
    pub end: usize,
}

impl Span {
    /// Create a new span. `start` must not exceed `end`.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} exceeds end {end}");
        Self { start, end }
    }

    /// An empty span anchored at `at`, denoting "not found".
    #[must_use]
    pub const fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    /// Whether this span covers no characters.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Number of bytes covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// The text covered by this span in `buffer`.
    #[must_use]
    pub fn slice<'t>(&self, buffer: &'t str) -> &'t str {
        &buffer[self.start..self.end]
    }

    /// The same span shifted `by` bytes to the right. Used to lift spans
    /// produced by a sub-scan of a block body back into buffer coordinates.
    #[must_use]
    pub const fn offset(&self, by: usize) -> Self {
        Self {
            start: self.start + by,
            end: self.end + by,
        }
    }

    /// Whether this span overlaps `other`. Touching spans do not overlap.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice() {
        let text = "origin { hostname = \"example.com\" }";
        let span = Span::new(9, 17);
        assert_eq!(span.slice(text), "hostname");
    }

    #[test]
    fn test_empty_span() {
        let span = Span::empty(12);
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
    }

    #[test]
    fn test_offset() {
        assert_eq!(Span::new(3, 7).offset(10), Span::new(13, 17));
    }

    #[test]
    fn test_overlaps() {
        let a = Span::new(0, 10);
        let b = Span::new(5, 15);
        let c = Span::new(10, 20);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // Half-open: touching spans are disjoint
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn test_empty_span_never_overlaps() {
        let a = Span::new(0, 10);
        let e = Span::empty(5);
        assert!(!e.overlaps(&e));
        // An empty span inside another still reports overlap per the raw
        // range arithmetic; callers must filter empties before edit
        // construction.
        assert!(a.overlaps(&e));
    }
}
