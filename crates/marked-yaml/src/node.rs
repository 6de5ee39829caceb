//! The node graph consumed by the constructor.
//!
//! Nodes live in an arena and refer to their children by [`NodeId`]. An alias
//! is just a second reference to an existing id, so shared and recursive
//! structures need no special representation.

use marked_yaml_source_map::Span;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// How a scalar was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Scalar => "a scalar node",
            NodeKind::Sequence => "a sequence node",
            NodeKind::Mapping => "a mapping node",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Scalar { value: String, style: ScalarStyle },
    Sequence(Vec<NodeId>),
    Mapping(Vec<(NodeId, NodeId)>),
}

/// One node of the graph with its resolved tag and source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub tag: String,
    pub span: Span,
    pub content: NodeContent,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self.content {
            NodeContent::Scalar { .. } => NodeKind::Scalar,
            NodeContent::Sequence(_) => NodeKind::Sequence,
            NodeContent::Mapping(_) => NodeKind::Mapping,
        }
    }
}

/// A document's nodes plus the id of its root.
///
/// Built by the composer from YAML text, or by hand through the builder
/// methods when another parser produces the nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeGraph {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn add_scalar(
        &mut self,
        tag: impl Into<String>,
        value: impl Into<String>,
        style: ScalarStyle,
        span: Span,
    ) -> NodeId {
        self.push(Node {
            tag: tag.into(),
            span,
            content: NodeContent::Scalar {
                value: value.into(),
                style,
            },
        })
    }

    pub fn add_sequence(&mut self, tag: impl Into<String>, span: Span) -> NodeId {
        self.push(Node {
            tag: tag.into(),
            span,
            content: NodeContent::Sequence(Vec::new()),
        })
    }

    pub fn add_mapping(&mut self, tag: impl Into<String>, span: Span) -> NodeId {
        self.push(Node {
            tag: tag.into(),
            span,
            content: NodeContent::Mapping(Vec::new()),
        })
    }

    /// Append `item` to a sequence node. Returns false if `seq` is not a
    /// sequence.
    pub fn push_item(&mut self, seq: NodeId, item: NodeId) -> bool {
        match self.nodes.get_mut(seq.0).map(|n| &mut n.content) {
            Some(NodeContent::Sequence(items)) => {
                items.push(item);
                true
            }
            _ => false,
        }
    }

    /// Append a key/value entry to a mapping node. Returns false if `map` is
    /// not a mapping.
    pub fn push_entry(&mut self, map: NodeId, key: NodeId, value: NodeId) -> bool {
        match self.nodes.get_mut(map.0).map(|n| &mut n.content) {
            Some(NodeContent::Mapping(entries)) => {
                entries.push((key, value));
                true
            }
            _ => false,
        }
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.span = span;
        }
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    #[test]
    fn test_builder() {
        let mut graph = NodeGraph::new();
        let map = graph.add_mapping(schema::MAP, Span::default());
        let key = graph.add_scalar(schema::STR, "name", ScalarStyle::Plain, Span::default());
        let value = graph.add_scalar(schema::STR, "Jane", ScalarStyle::DoubleQuoted, Span::default());
        assert!(graph.push_entry(map, key, value));
        assert!(!graph.push_item(map, key));
        graph.set_root(map);

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.root(), Some(map));
        let node = graph.node(map).unwrap();
        assert_eq!(node.kind(), NodeKind::Mapping);
        assert_eq!(node.content, NodeContent::Mapping(vec![(key, value)]));
        assert!(graph.node(NodeId(10)).is_none());
    }

    #[test]
    fn test_nodes_may_refer_to_ancestors() {
        let mut graph = NodeGraph::new();
        let seq = graph.add_sequence(schema::SEQ, Span::default());
        assert!(graph.push_item(seq, seq));
        assert_eq!(
            graph.node(seq).unwrap().content,
            NodeContent::Sequence(vec![seq])
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(NodeKind::Scalar.to_string(), "a scalar node");
        assert_eq!(NodeKind::Mapping.to_string(), "a mapping node");
    }
}
