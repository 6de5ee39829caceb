//! Line index for offset lookups

use crate::types::{Position, Span};

/// Line break table for one source text
///
/// Stores the character offset of every newline so that offsets can be turned
/// into (line, column) positions without rescanning the text.
#[derive(Debug, Clone, PartialEq)]
pub struct LineIndex {
    /// Character offsets of each newline character
    line_breaks: Vec<usize>,

    /// Total length of the text in characters
    total_length: usize,
}

impl LineIndex {
    /// Build the index by scanning `content` once.
    ///
    /// # Example
    ///
    /// ```
    /// use marked_yaml_source_map::LineIndex;
    ///
    /// let index = LineIndex::new("hello\nworld");
    /// let pos = index.position(6).unwrap();
    /// assert_eq!(pos.line, 1);
    /// assert_eq!(pos.column, 0);
    /// ```
    pub fn new(content: &str) -> Self {
        let mut line_breaks = Vec::new();
        let mut total_length = 0;
        for (idx, ch) in content.chars().enumerate() {
            if ch == '\n' {
                line_breaks.push(idx);
            }
            total_length = idx + 1;
        }

        LineIndex {
            line_breaks,
            total_length,
        }
    }

    /// Convert a character offset to a Position.
    ///
    /// Binary search over the line breaks, O(log n) in the number of lines.
    /// Returns None if the offset is past the end of the text.
    pub fn position(&self, offset: usize) -> Option<Position> {
        if offset > self.total_length {
            return None;
        }

        // A newline belongs to the line it terminates
        let line = match self.line_breaks.binary_search(&offset) {
            Ok(idx) | Err(idx) => idx,
        };

        let line_start = if line == 0 {
            0
        } else {
            self.line_breaks[line - 1] + 1
        };

        Some(Position::new(offset, line, offset - line_start))
    }

    /// Like [`LineIndex::position`], clamping out-of-range offsets to the end
    /// of the text.
    pub fn position_clamped(&self, offset: usize) -> Position {
        let offset = offset.min(self.total_length);
        self.position(offset)
            .unwrap_or_else(|| Position::new(offset, 0, offset))
    }

    /// Build a span from two character offsets.
    pub fn span(&self, start: usize, end: usize) -> Option<Span> {
        Some(Span::new(self.position(start)?, self.position(end)?))
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    pub fn line_count(&self) -> usize {
        self.line_breaks.len() + 1
    }
}
