//! Source location tracking

use serde::{Deserialize, Serialize};

/// A region of source text, tracked as 1-based line/column pairs.
///
/// Columns count characters, not bytes. The zero span (`Span::dummy`) marks
/// synthesized nodes with no real source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Line of the first character (1-based)
    pub start_line: u32,
    /// Column of the first character (1-based)
    pub start_column: u32,
    /// Line of the last character (1-based)
    pub end_line: u32,
    /// Column one past the last character (1-based)
    pub end_column: u32,
}

impl Span {
    /// Create a span from explicit endpoints
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// A span covering a single point
    pub fn point(line: u32, column: u32) -> Self {
        Self::new(line, column, line, column)
    }

    /// Placeholder span for synthesized nodes
    pub fn dummy() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Smallest span covering both `self` and `other`
    pub fn merge(self, other: Span) -> Span {
        let (start_line, start_column) =
            if (other.start_line, other.start_column) < (self.start_line, self.start_column) {
                (other.start_line, other.start_column)
            } else {
                (self.start_line, self.start_column)
            };
        let (end_line, end_column) =
            if (other.end_line, other.end_column) > (self.end_line, self.end_column) {
                (other.end_line, other.end_column)
            } else {
                (self.end_line, self.end_column)
            };
        Span::new(start_line, start_column, end_line, end_column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_orders_endpoints() {
        let a = Span::new(2, 5, 2, 9);
        let b = Span::new(1, 1, 1, 4);
        let merged = a.merge(b);
        assert_eq!(merged, Span::new(1, 1, 2, 9));
    }

    #[test]
    fn test_merge_same_line() {
        let a = Span::new(3, 1, 3, 4);
        let b = Span::new(3, 8, 3, 12);
        assert_eq!(a.merge(b), Span::new(3, 1, 3, 12));
    }
}
