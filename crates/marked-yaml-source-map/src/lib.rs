//! Source positions for marked YAML values
//!
//! This crate provides the coordinates every constructed YAML value carries
//! back to the text that produced it.
//!
//! # Overview
//!
//! - [`Position`]: a single point in the source (character offset, line, column)
//! - [`Span`]: an immutable start/end pair of positions
//! - [`LineIndex`]: converts character offsets into positions
//!
//! # Example
//!
//! ```rust
//! use marked_yaml_source_map::*;
//!
//! let index = LineIndex::new("name: Jane\nage: 29\n");
//! let span = index.span(16, 18).unwrap();
//!
//! assert_eq!(span.start().line, 1);
//! assert_eq!(span.start().column, 5);
//! assert_eq!(span.to_string(), "line 2, column 6");
//! ```

pub mod line_index;
pub mod types;

pub use line_index::LineIndex;
pub use types::{Position, Span};
