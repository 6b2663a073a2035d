//! Byte-offset spans into diagram source text.

use std::ops::Range;

/// A half-open byte range `start..end` into the source text.
///
/// # Example
///
/// ```
/// # use tracery_parser::Span;
/// let a = Span::new(4..9);
/// let b = Span::new(12..15);
///
/// assert_eq!(a.len(), 5);
/// assert_eq!(a.union(b), Span::new(4..15));
/// assert_eq!(a.shifted(10), Span::new(14..19));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a span from a byte range. A reversed range is normalized.
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start.min(range.end),
            end: range.end.max(range.start),
        }
    }

    /// An empty span at `offset`.
    pub fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The smallest span covering both `self` and `other`.
    pub fn union(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Moves the span forward by `offset` bytes.
    pub fn shifted(self, offset: usize) -> Span {
        Span {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range)
    }
}

/// A value paired with the source span it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    value: T,
    span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    pub fn inner(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Transforms the wrapped value, keeping its span.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_normalizes_reversed_range() {
        let span = Span::new(9..3);
        assert_eq!(span.start(), 3);
        assert_eq!(span.end(), 9);
    }

    #[test]
    fn test_point_span_is_empty() {
        let span = Span::point(7);
        assert!(span.is_empty());
        assert_eq!(span.range(), 7..7);
    }

    #[test]
    fn test_spanned_map_keeps_span() {
        let spanned = Spanned::new("42", Span::new(3..5)).map(|s| s.len());
        assert_eq!(*spanned.inner(), 2);
        assert_eq!(spanned.span(), Span::new(3..5));
    }
}
