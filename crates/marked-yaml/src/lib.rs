//! # marked-yaml
//!
//! YAML document construction where every value knows where it came from.
//!
//! Each scalar, sequence, mapping and set built by this crate behaves like the
//! plain value for equality, hashing, ordering, truthiness and iteration, and
//! additionally exposes the [`Span`] of source text that produced it.
//!
//! ## Design
//!
//! - [`MarkedValue`] is a closed enum with one variant per YAML kind. Scalars
//!   are [`Marked<T>`] (a payload plus a span); collections are shared handles
//!   so anchors, aliases and self-references all see the same instance.
//! - A [`Registry`] caches the wrapping strategy for each kind.
//! - A [`Constructor`] walks a [`NodeGraph`] and dispatches on resolved tags.
//!   Text is turned into node graphs with `yaml-rust2`.
//!
//! ## Example
//!
//! ```rust
//! use marked_yaml::load;
//!
//! let doc = load("roles: [admin, editor]\nactive: yes\n").unwrap();
//!
//! let active = doc.get("active").unwrap();
//! assert!(active == true);
//! assert_eq!(active.span().to_string(), "line 2, column 9");
//!
//! let roles = doc.get("roles").unwrap();
//! assert_eq!(roles.to_string(), r#"["admin", "editor"]"#);
//! ```

pub mod collections;
pub mod composer;
pub mod config;
pub mod constructor;
pub mod error;
pub mod marked;
pub mod node;
pub mod registry;
pub mod resolver;
pub mod scalar;
pub mod schema;
pub mod timestamp;
pub mod value;

pub use collections::{MarkedMap, MarkedPairs, MarkedSeq, MarkedSet, Shared};
pub use composer::{compose, compose_all};
pub use config::{ConstructorConfig, DuplicateKeys};
pub use constructor::{load, load_all, Constructor, ScalarParser};
pub use error::{
    ComposeError, ConstructError, Error, Result, ScalarKind, ScalarParseError, StructureError,
    UnknownTagError, WrapError,
};
pub use marked::Marked;
pub use marked_yaml_source_map::{LineIndex, Position, Span};
pub use node::{Node, NodeContent, NodeGraph, NodeId, NodeKind, ScalarStyle};
pub use registry::Registry;
pub use schema::Schema;
pub use timestamp::{parse_timestamp, ParsedTimestamp, Timestamp};
pub use value::{BaseValue, MarkedValue, ValueKind};
