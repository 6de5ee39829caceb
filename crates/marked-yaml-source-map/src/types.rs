//! Core types for source positions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text (0-indexed)
///
/// Offsets count characters, not bytes, because that is the unit the YAML
/// scanner reports.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    /// Character offset from start of source
    pub offset: usize,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters)
    pub column: usize,
}

impl Position {
    pub const fn new(offset: usize, line: usize, column: usize) -> Self {
        Position {
            offset,
            line,
            column,
        }
    }

    /// Line number as shown to users (1-based)
    pub const fn line_number(&self) -> usize {
        self.line + 1
    }

    /// Column number as shown to users (1-based)
    pub const fn column_number(&self) -> usize {
        self.column + 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}",
            self.line_number(),
            self.column_number()
        )
    }
}

/// The source region that produced a value, from start (inclusive) to end
/// (exclusive).
///
/// Spans are immutable once built. No ordering between `start` and `end` is
/// enforced; zero-width spans (`start == end`) are normal for empty nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    start: Position,
    end: Position,
}

impl Span {
    pub const fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// A zero-width span at `position`
    pub const fn point(position: Position) -> Self {
        Span {
            start: position,
            end: position,
        }
    }

    pub const fn start(&self) -> Position {
        self.start
    }

    pub const fn end(&self) -> Position {
        self.end
    }

    /// Number of characters covered by the span
    pub const fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether `other` lies entirely inside this span.
    pub const fn contains(&self, other: &Span) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.start.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        let pos1 = Position::new(0, 0, 0);
        let pos2 = Position::new(5, 0, 5);
        let pos3 = Position::new(10, 1, 0);

        assert!(pos1 < pos2);
        assert!(pos2 < pos3);
        assert!(pos1 < pos3);
    }

    #[test]
    fn test_position_display_is_one_based() {
        let pos = Position::new(12, 4, 2);
        assert_eq!(pos.to_string(), "line 5, column 3");
    }

    #[test]
    fn test_span_accessors() {
        let span = Span::new(Position::new(3, 0, 3), Position::new(8, 0, 8));
        assert_eq!(span.start().offset, 3);
        assert_eq!(span.end().offset, 8);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_zero_width_span() {
        let span = Span::point(Position::new(4, 1, 0));
        assert_eq!(span.start(), span.end());
        assert!(span.is_empty());
    }

    #[test]
    fn test_span_contains() {
        let outer = Span::new(Position::new(0, 0, 0), Position::new(20, 1, 5));
        let inner = Span::new(Position::new(16, 1, 1), Position::new(18, 1, 3));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn test_serialization_span() {
        let span = Span::new(Position::new(0, 0, 0), Position::new(50, 2, 10));
        let json = serde_json::to_string(&span).unwrap();
        let deserialized: Span = serde_json::from_str(&json).unwrap();
        assert_eq!(span, deserialized);
    }
}
