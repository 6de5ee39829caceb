//! Error types for marked YAML construction.
//!
//! Construction fails on the first problem it meets and never returns a
//! partially built tree. Every error carries the span of the offending node so
//! callers can point at `line L, column C`.

use crate::value::ValueKind;
use marked_yaml_source_map::{Position, Span};
use std::fmt;
use thiserror::Error;

/// Result type alias for marked-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// No wrapping strategy exists for a value kind under the active schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no marked representation for a value of kind `{kind}`, at {span}")]
pub struct WrapError {
    pub kind: ValueKind,
    pub span: Span,
}

/// The grammar a scalar constructor expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Null,
    Bool,
    Int,
    Float,
    Binary,
    Timestamp,
    Str,
    /// A scalar constructor registered for an application tag
    Custom,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarKind::Null => "null",
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Binary => "binary",
            ScalarKind::Timestamp => "timestamp",
            ScalarKind::Str => "str",
            ScalarKind::Custom => "custom",
        })
    }
}

/// A scalar's lexical form does not match the grammar of its tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} scalar {raw:?} for tag {tag:?}, at {span}")]
pub struct ScalarParseError {
    pub kind: ScalarKind,
    pub tag: String,
    pub span: Span,
    /// The scalar text exactly as the parser delivered it
    pub raw: String,
}

/// A node has the wrong shape for the constructor its tag selected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("while constructing {context}: expected {expected}, but found {found}, at {span}")]
pub struct StructureError {
    pub context: &'static str,
    pub expected: String,
    pub found: String,
    /// Span of the offending node (the sub-item for omap/pairs entries)
    pub span: Span,
}

impl StructureError {
    pub fn new(
        context: &'static str,
        expected: impl Into<String>,
        found: impl Into<String>,
        span: Span,
    ) -> Self {
        StructureError {
            context,
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }
}

/// No constructor is registered for a node's tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not determine a constructor for the tag {tag:?}, at {span}")]
pub struct UnknownTagError {
    pub tag: String,
    pub span: Span,
}

/// Errors raised while turning a node graph into marked values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructError {
    #[error(transparent)]
    Wrap(#[from] WrapError),

    #[error(transparent)]
    ScalarParse(#[from] ScalarParseError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    UnknownTag(#[from] UnknownTagError),
}

impl ConstructError {
    /// Span of the node that caused the failure.
    pub fn span(&self) -> Span {
        match self {
            ConstructError::Wrap(e) => e.span,
            ConstructError::ScalarParse(e) => e.span,
            ConstructError::Structure(e) => e.span,
            ConstructError::UnknownTag(e) => e.span,
        }
    }
}

/// Errors raised while building the node graph from YAML text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// The scanner or parser rejected the input
    #[error("YAML syntax error: {message}, at {position}")]
    Syntax { message: String, position: Position },

    /// An alias names an anchor that was never defined
    #[error("found undefined alias, at {position}")]
    UndefinedAlias { position: Position },

    /// A scalar's text could not be matched against the source
    #[error("could not locate the end of a scalar, at {position}")]
    UnlocatedScalar { position: Position },
}

/// Any failure of [`crate::load`] and friends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Construct(#[from] ConstructError),
}

impl From<WrapError> for Error {
    fn from(err: WrapError) -> Self {
        Error::Construct(err.into())
    }
}

impl From<ScalarParseError> for Error {
    fn from(err: ScalarParseError) -> Self {
        Error::Construct(err.into())
    }
}

impl From<StructureError> for Error {
    fn from(err: StructureError) -> Self {
        Error::Construct(err.into())
    }
}

impl From<UnknownTagError> for Error {
    fn from(err: UnknownTagError) -> Self {
        Error::Construct(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_at(offset: usize, line: usize, column: usize) -> Span {
        Span::point(Position::new(offset, line, column))
    }

    #[test]
    fn test_unknown_tag_message() {
        let err = UnknownTagError {
            tag: "!custom".into(),
            span: span_at(10, 2, 4),
        };
        insta::assert_snapshot!(
            err.to_string(),
            @r#"could not determine a constructor for the tag "!custom", at line 3, column 5"#
        );
    }

    #[test]
    fn test_scalar_parse_message() {
        let err = ScalarParseError {
            kind: ScalarKind::Int,
            tag: "tag:yaml.org,2002:int".into(),
            span: span_at(0, 0, 0),
            raw: "12abc".into(),
        };
        insta::assert_snapshot!(
            err.to_string(),
            @r#"invalid int scalar "12abc" for tag "tag:yaml.org,2002:int", at line 1, column 1"#
        );
    }

    #[test]
    fn test_structure_message() {
        let err = StructureError::new(
            "pairs",
            "a single mapping item",
            "2 items",
            span_at(7, 1, 2),
        );
        assert_eq!(
            err.to_string(),
            "while constructing pairs: expected a single mapping item, but found 2 items, at line 2, column 3"
        );
    }

    #[test]
    fn test_construct_error_span() {
        let span = span_at(3, 0, 3);
        let err: ConstructError = WrapError {
            kind: ValueKind::Bytes,
            span,
        }
        .into();
        assert_eq!(err.span(), span);
        assert_eq!(
            err.to_string(),
            "no marked representation for a value of kind `bytes`, at line 1, column 4"
        );
    }

    #[test]
    fn test_top_level_conversion() {
        let err: Error = UnknownTagError {
            tag: "!x".into(),
            span: Span::default(),
        }
        .into();
        assert!(matches!(
            err,
            Error::Construct(ConstructError::UnknownTag(_))
        ));
    }
}
