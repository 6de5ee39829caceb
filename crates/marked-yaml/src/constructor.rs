//! The document driver.
//!
//! A [`Constructor`] walks a [`NodeGraph`] depth first, dispatches every node
//! on its resolved tag and returns the marked value of the root. The first
//! error aborts the document; no partial tree is ever returned.

use crate::composer;
use crate::config::{ConstructorConfig, DuplicateKeys};
use crate::error::{
    self, ConstructError, ScalarKind, ScalarParseError, StructureError, UnknownTagError,
};
use crate::node::{Node, NodeContent, NodeGraph, NodeId};
use crate::registry::Registry;
use crate::scalar;
use crate::schema::{self, Schema};
use crate::value::{BaseValue, MarkedValue, ValueKind};
use indexmap::{IndexMap, IndexSet};
use marked_yaml_source_map::Span;
use std::collections::{HashMap, HashSet};

/// Parser for a custom scalar tag; None rejects the text.
pub type ScalarParser = fn(&str) -> Option<BaseValue>;

#[derive(Clone, Copy)]
enum TagHandler {
    Scalar(ScalarKind),
    Sequence,
    Mapping,
    Set,
    Omap,
    Pairs,
    Custom { kind: ValueKind, parse: ScalarParser },
}

fn default_handlers(config: &ConstructorConfig) -> HashMap<String, TagHandler> {
    let mut handlers = HashMap::new();
    for tag in config.schema.tags() {
        let handler = match *tag {
            schema::NULL => TagHandler::Scalar(ScalarKind::Null),
            schema::BOOL => TagHandler::Scalar(ScalarKind::Bool),
            schema::INT => TagHandler::Scalar(ScalarKind::Int),
            schema::FLOAT => TagHandler::Scalar(ScalarKind::Float),
            schema::BINARY => TagHandler::Scalar(ScalarKind::Binary),
            schema::TIMESTAMP => TagHandler::Scalar(ScalarKind::Timestamp),
            schema::SEQ => TagHandler::Sequence,
            schema::MAP => TagHandler::Mapping,
            schema::SET => TagHandler::Set,
            schema::OMAP => TagHandler::Omap,
            schema::PAIRS => TagHandler::Pairs,
            _ => TagHandler::Scalar(ScalarKind::Str),
        };
        handlers.insert(tag.to_string(), handler);
    }
    if config.schema == Schema::Yaml11 {
        // `<<` and `=` outside their special positions are just text
        handlers.insert(schema::MERGE.to_string(), TagHandler::Scalar(ScalarKind::Str));
        handlers.insert(schema::VALUE.to_string(), TagHandler::Scalar(ScalarKind::Str));
    }
    handlers
}

/// Builds marked values from node graphs.
///
/// # Example
///
/// ```rust
/// use marked_yaml::Constructor;
///
/// let mut constructor = Constructor::default();
/// let doc = constructor.load("name: \"Jane\"\nage: 29").unwrap();
///
/// let age = doc.get("age").unwrap();
/// assert_eq!(age, 29i64);
/// assert_eq!(age.span().start().line, 1);
/// assert_eq!(age.span().start().column, 5);
/// ```
pub struct Constructor {
    config: ConstructorConfig,
    registry: Registry,
    handlers: HashMap<String, TagHandler>,
}

impl Constructor {
    pub fn new(config: ConstructorConfig) -> Self {
        Constructor {
            registry: Registry::new(config.schema),
            handlers: default_handlers(&config),
            config,
        }
    }

    pub fn config(&self) -> &ConstructorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Whether nodes tagged `tag` can be constructed.
    pub fn handles(&self, tag: &str) -> bool {
        self.handlers.contains_key(tag)
    }

    /// Construct scalars tagged `tag` with `parse`.
    ///
    /// The parsed value must be of `kind`, and `kind` must be representable
    /// under the configured schema; otherwise construction fails.
    pub fn register_scalar(&mut self, tag: impl Into<String>, kind: ValueKind, parse: ScalarParser) {
        let tag = tag.into();
        tracing::debug!(tag = %tag, kind = %kind, "registered scalar constructor");
        self.handlers.insert(tag, TagHandler::Custom { kind, parse });
    }

    /// Construct the marked value of `graph`'s root.
    ///
    /// A graph without a root yields a zero-width null.
    pub fn construct(&mut self, graph: &NodeGraph) -> Result<MarkedValue, ConstructError> {
        if !self.config.reuse_registry {
            self.registry.clear();
        }
        let Some(root) = graph.root() else {
            return Ok(self.registry.wrap(BaseValue::Null, Span::default())?);
        };

        tracing::debug!(nodes = graph.len(), schema = ?self.config.schema, "constructing document");
        let mut pass = Pass {
            config: &self.config,
            handlers: &self.handlers,
            registry: &mut self.registry,
            graph,
            constructed: HashMap::new(),
            in_progress: HashSet::new(),
            merging: Vec::new(),
        };
        let value = pass.construct(root)?;
        tracing::debug!(kind = %value.kind(), span = %value.span(), "constructed document");
        Ok(value)
    }

    /// Construct several documents in order.
    pub fn construct_all(&mut self, graphs: &[NodeGraph]) -> Result<Vec<MarkedValue>, ConstructError> {
        graphs.iter().map(|graph| self.construct(graph)).collect()
    }

    /// Parse and construct the single document in `content`.
    pub fn load(&mut self, content: &str) -> error::Result<MarkedValue> {
        let graph = composer::compose(content, self.config.schema)?;
        Ok(self.construct(&graph)?)
    }

    /// Parse and construct every document of a stream.
    pub fn load_all(&mut self, content: &str) -> error::Result<Vec<MarkedValue>> {
        let graphs = composer::compose_all(content, self.config.schema)?;
        Ok(self.construct_all(&graphs)?)
    }
}

impl Default for Constructor {
    fn default() -> Self {
        Constructor::new(ConstructorConfig::default())
    }
}

/// One mapping entry after merge keys are expanded.
#[derive(Clone, Copy)]
struct Entry {
    key: NodeId,
    value: NodeId,
    /// Written in the mapping itself rather than merged in
    explicit: bool,
}

impl Entry {
    fn merged(self) -> Entry {
        Entry {
            explicit: false,
            ..self
        }
    }
}

/// State of a single construction pass.
struct Pass<'c, 'g> {
    config: &'c ConstructorConfig,
    handlers: &'c HashMap<String, TagHandler>,
    registry: &'c mut Registry,
    graph: &'g NodeGraph,
    constructed: HashMap<NodeId, MarkedValue>,
    /// Collections created but not yet filled
    in_progress: HashSet<NodeId>,
    /// Mappings whose merge keys are being expanded
    merging: Vec<NodeId>,
}

impl<'c, 'g> Pass<'c, 'g> {
    fn node(&self, id: NodeId) -> Result<&'g Node, ConstructError> {
        let graph: &'g NodeGraph = self.graph;
        graph.node(id).ok_or_else(|| {
            StructureError::new(
                "a document",
                "a node in the graph",
                format!("a reference to missing node {}", id.0),
                Span::default(),
            )
            .into()
        })
    }

    fn construct(&mut self, id: NodeId) -> Result<MarkedValue, ConstructError> {
        if let Some(value) = self.constructed.get(&id) {
            return Ok(if self.in_progress.contains(&id) {
                value.back_reference()
            } else {
                value.clone()
            });
        }

        let node = self.node(id)?;
        let handler = self
            .handlers
            .get(node.tag.as_str())
            .copied()
            .ok_or_else(|| UnknownTagError {
                tag: node.tag.clone(),
                span: node.span,
            })?;
        tracing::trace!(tag = %node.tag, node = id.0, "dispatching node");

        let value = match handler {
            TagHandler::Scalar(kind) => self.scalar(node, kind)?,
            TagHandler::Custom { kind, parse } => self.custom(node, kind, parse)?,
            TagHandler::Sequence => self.sequence(id, node)?,
            TagHandler::Mapping => self.mapping(id, node)?,
            TagHandler::Set => self.set(id, node)?,
            TagHandler::Omap => self.pairs(id, node, "an ordered map")?,
            TagHandler::Pairs => self.pairs(id, node, "pairs")?,
        };
        self.constructed.insert(id, value.clone());
        Ok(value)
    }

    /// Text of a scalar node. A mapping stands in for a scalar when it has a
    /// `=` key, whose value is used instead.
    fn raw_scalar(&self, node: &'g Node, context: &'static str) -> Result<&'g str, ConstructError> {
        match &node.content {
            NodeContent::Scalar { value, .. } => Ok(value),
            NodeContent::Mapping(entries) => {
                for &(key, value) in entries {
                    if self.node(key)?.tag == schema::VALUE {
                        return self.raw_scalar(self.node(value)?, context);
                    }
                }
                Err(Self::not_a_scalar(node, context))
            }
            NodeContent::Sequence(_) => Err(Self::not_a_scalar(node, context)),
        }
    }

    fn not_a_scalar(node: &Node, context: &'static str) -> ConstructError {
        StructureError::new(context, "a scalar node", node.kind().to_string(), node.span).into()
    }

    fn scalar(&mut self, node: &'g Node, kind: ScalarKind) -> Result<MarkedValue, ConstructError> {
        let raw = self.raw_scalar(node, "a scalar")?;
        let base = scalar::parse(kind, raw, self.config.schema).ok_or_else(|| ScalarParseError {
            kind,
            tag: node.tag.clone(),
            span: node.span,
            raw: raw.to_string(),
        })?;
        Ok(self.registry.wrap(base, node.span)?)
    }

    fn custom(
        &mut self,
        node: &'g Node,
        kind: ValueKind,
        parse: ScalarParser,
    ) -> Result<MarkedValue, ConstructError> {
        let raw = self.raw_scalar(node, "a scalar")?;
        let base = parse(raw)
            .filter(|base| base.kind() == kind)
            .ok_or_else(|| ScalarParseError {
                kind: ScalarKind::Custom,
                tag: node.tag.clone(),
                span: node.span,
                raw: raw.to_string(),
            })?;
        Ok(self.registry.wrap(base, node.span)?)
    }

    /// Create the empty collection for `id` and make it visible to its own
    /// children.
    fn begin(&mut self, id: NodeId, kind: ValueKind, span: Span) -> Result<MarkedValue, ConstructError> {
        let value = self.registry.empty(kind, span)?;
        self.constructed.insert(id, value.clone());
        self.in_progress.insert(id);
        Ok(value)
    }

    fn finish(&mut self, id: NodeId) {
        self.in_progress.remove(&id);
    }

    fn sequence(&mut self, id: NodeId, node: &'g Node) -> Result<MarkedValue, ConstructError> {
        let NodeContent::Sequence(items) = &node.content else {
            return Err(StructureError::new(
                "a sequence",
                "a sequence node",
                node.kind().to_string(),
                node.span,
            )
            .into());
        };

        let value = self.begin(id, ValueKind::Sequence, node.span)?;
        let mut built = Vec::with_capacity(items.len());
        for item in items {
            built.push(self.construct(*item)?);
        }
        if let MarkedValue::Sequence(seq) = &value {
            seq.fill(built);
        }
        self.finish(id);
        Ok(value)
    }

    fn mapping(&mut self, id: NodeId, node: &'g Node) -> Result<MarkedValue, ConstructError> {
        let entries = self.flatten(id, node, "a mapping")?;
        let value = self.begin(id, ValueKind::Mapping, node.span)?;

        let mut map = IndexMap::with_capacity(entries.len());
        let mut explicit = HashSet::new();
        for entry in entries {
            let key = self.construct(entry.key)?;
            let item = self.construct(entry.value)?;
            if entry.explicit {
                self.check_unique(&mut explicit, &key, "a mapping")?;
            }
            map.insert(key, item);
        }
        if let MarkedValue::Mapping(handle) = &value {
            handle.fill(map);
        }
        self.finish(id);
        Ok(value)
    }

    /// Only keys become members; values are constructed and dropped.
    fn set(&mut self, id: NodeId, node: &'g Node) -> Result<MarkedValue, ConstructError> {
        let entries = self.flatten(id, node, "a set")?;
        let value = self.begin(id, ValueKind::Set, node.span)?;

        let mut members = IndexSet::with_capacity(entries.len());
        let mut explicit = HashSet::new();
        for entry in entries {
            let key = self.construct(entry.key)?;
            self.construct(entry.value)?;
            if entry.explicit {
                self.check_unique(&mut explicit, &key, "a set")?;
            }
            members.insert(key);
        }
        if let MarkedValue::Set(handle) = &value {
            handle.fill(members);
        }
        self.finish(id);
        Ok(value)
    }

    fn pairs(
        &mut self,
        id: NodeId,
        node: &'g Node,
        context: &'static str,
    ) -> Result<MarkedValue, ConstructError> {
        let NodeContent::Sequence(items) = &node.content else {
            return Err(StructureError::new(
                context,
                "a sequence",
                node.kind().to_string(),
                node.span,
            )
            .into());
        };

        let value = self.begin(id, ValueKind::Pairs, node.span)?;
        let mut pairs = Vec::with_capacity(items.len());
        for item in items {
            let sub = self.node(*item)?;
            let (key, item_value) = match &sub.content {
                NodeContent::Mapping(entries) if entries.len() == 1 => entries[0],
                NodeContent::Mapping(entries) => {
                    return Err(StructureError::new(
                        context,
                        "a mapping of length 1",
                        format!("a mapping of length {}", entries.len()),
                        sub.span,
                    )
                    .into());
                }
                _ => {
                    return Err(StructureError::new(
                        context,
                        "a mapping of length 1",
                        sub.kind().to_string(),
                        sub.span,
                    )
                    .into());
                }
            };
            pairs.push((self.construct(key)?, self.construct(item_value)?));
        }
        if let MarkedValue::Pairs(handle) = &value {
            handle.fill(pairs);
        }
        self.finish(id);
        Ok(value)
    }

    fn check_unique(
        &self,
        seen: &mut HashSet<MarkedValue>,
        key: &MarkedValue,
        context: &'static str,
    ) -> Result<(), ConstructError> {
        if self.config.duplicate_keys == DuplicateKeys::Reject && !seen.insert(key.clone()) {
            return Err(StructureError::new(
                context,
                "unique keys",
                format!("a duplicate key {key}"),
                key.span(),
            )
            .into());
        }
        Ok(())
    }

    /// Entries of a mapping node with `<<` merge keys expanded.
    ///
    /// Merged entries come first so the mapping's own entries win; within a
    /// list of merged mappings, earlier mappings win over later ones.
    fn flatten(
        &mut self,
        id: NodeId,
        node: &'g Node,
        context: &'static str,
    ) -> Result<Vec<Entry>, ConstructError> {
        let NodeContent::Mapping(entries) = &node.content else {
            return Err(StructureError::new(
                context,
                "a mapping node",
                node.kind().to_string(),
                node.span,
            )
            .into());
        };

        let own = entries.iter().map(|&(key, value)| Entry {
            key,
            value,
            explicit: true,
        });
        if !self.config.merge_keys {
            return Ok(own.collect());
        }
        if self.merging.contains(&id) {
            return Err(StructureError::new(
                context,
                "a mapping to merge",
                "a recursive merge",
                node.span,
            )
            .into());
        }

        self.merging.push(id);
        let result = self.expand_merges(entries, context);
        self.merging.pop();

        let mut flattened = result?;
        flattened.extend(own.filter(|entry| {
            self.graph
                .node(entry.key)
                .is_none_or(|key| key.tag != schema::MERGE)
        }));
        Ok(flattened)
    }

    fn expand_merges(
        &mut self,
        entries: &'g [(NodeId, NodeId)],
        context: &'static str,
    ) -> Result<Vec<Entry>, ConstructError> {
        let mut merged = Vec::new();
        for &(key, value) in entries {
            if self.node(key)?.tag != schema::MERGE {
                continue;
            }
            let source = self.node(value)?;
            match &source.content {
                NodeContent::Mapping(_) => {
                    let group = self.flatten(value, source, context)?;
                    merged.extend(group.into_iter().map(Entry::merged));
                }
                NodeContent::Sequence(items) => {
                    let mut groups = Vec::with_capacity(items.len());
                    for &item in items {
                        let sub = self.node(item)?;
                        if !matches!(sub.content, NodeContent::Mapping(_)) {
                            return Err(StructureError::new(
                                context,
                                "a mapping for merging",
                                sub.kind().to_string(),
                                sub.span,
                            )
                            .into());
                        }
                        groups.push(self.flatten(item, sub, context)?);
                    }
                    for group in groups.into_iter().rev() {
                        merged.extend(group.into_iter().map(Entry::merged));
                    }
                }
                NodeContent::Scalar { .. } => {
                    return Err(StructureError::new(
                        context,
                        "a mapping or list of mappings for merging",
                        source.kind().to_string(),
                        source.span,
                    )
                    .into());
                }
            }
        }
        Ok(merged)
    }
}

/// Load the single document in `content` with the default configuration.
pub fn load(content: &str) -> error::Result<MarkedValue> {
    Constructor::default().load(content)
}

/// Load every document of a stream with the default configuration.
pub fn load_all(content: &str) -> error::Result<Vec<MarkedValue>> {
    Constructor::default().load_all(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::node::ScalarStyle;
    use marked_yaml_source_map::Position;

    fn span(start: usize, end: usize) -> Span {
        Span::new(Position::new(start, 0, start), Position::new(end, 0, end))
    }

    #[test]
    fn test_hand_built_graph() {
        let mut graph = NodeGraph::new();
        let map = graph.add_mapping(schema::MAP, span(0, 20));
        let key = graph.add_scalar(schema::STR, "age", ScalarStyle::Plain, span(13, 16));
        let value = graph.add_scalar(schema::INT, "29", ScalarStyle::Plain, span(18, 20));
        graph.push_entry(map, key, value);
        graph.set_root(map);

        let doc = Constructor::default().construct(&graph).unwrap();
        assert_eq!(doc.span(), span(0, 20));
        let age = doc.get("age").unwrap();
        assert_eq!(age, 29i64);
        assert_eq!(age.span(), span(18, 20));
        let stored_key = doc.as_mapping().unwrap().get_key(&"age".into()).unwrap();
        assert_eq!(stored_key.span(), span(13, 16));
    }

    #[test]
    fn test_empty_graph_is_zero_width_null() {
        let doc = Constructor::default().construct(&NodeGraph::new()).unwrap();
        assert!(doc.is_null());
        assert!(doc.span().is_empty());
    }

    #[test]
    fn test_scalar_parse_error_carries_raw_text() {
        let mut graph = NodeGraph::new();
        let id = graph.add_scalar(schema::INT, "12abc", ScalarStyle::Plain, span(4, 9));
        graph.set_root(id);

        let err = Constructor::default().construct(&graph).unwrap_err();
        match err {
            ConstructError::ScalarParse(err) => {
                assert_eq!(err.kind, ScalarKind::Int);
                assert_eq!(err.raw, "12abc");
                assert_eq!(err.span, span(4, 9));
            }
            other => panic!("expected a scalar parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_scalar_tag_on_collection_is_structure_error() {
        let mut graph = NodeGraph::new();
        let id = graph.add_sequence(schema::INT, span(0, 2));
        graph.set_root(id);
        let err = Constructor::default().construct(&graph).unwrap_err();
        assert!(matches!(err, ConstructError::Structure(_)));
    }

    #[test]
    fn test_missing_node_is_reported() {
        let mut graph = NodeGraph::new();
        let seq = graph.add_sequence(schema::SEQ, span(0, 2));
        graph.push_item(seq, NodeId(42));
        graph.set_root(seq);
        let err = Constructor::default().construct(&graph).unwrap_err();
        assert!(matches!(err, ConstructError::Structure(_)));
    }

    #[test]
    fn test_registry_reset_between_documents() {
        let mut constructor = Constructor::default();
        constructor.load("a: 1").unwrap();
        let first = constructor.registry().synthesized();
        constructor.load("a: 1").unwrap();
        assert_eq!(constructor.registry().synthesized(), first * 2);
    }

    #[test]
    fn test_registry_reuse_in_batch_mode() {
        let config = ConstructorConfig::default().with_reuse_registry(true);
        let mut constructor = Constructor::new(config);
        constructor.load("a: 1").unwrap();
        let first = constructor.registry().synthesized();
        constructor.load("b: 2").unwrap();
        assert_eq!(constructor.registry().synthesized(), first);
    }

    #[test]
    fn test_core_schema_has_no_extended_tags() {
        let constructor = Constructor::new(ConstructorConfig::default().with_schema(Schema::Core));
        assert!(constructor.handles(schema::INT));
        assert!(!constructor.handles(schema::TIMESTAMP));
        assert!(!constructor.handles(schema::SET));
        assert!(!constructor.handles(schema::MERGE));
    }

    #[test]
    fn test_custom_scalar_kind_mismatch() {
        fn parse_as_string(raw: &str) -> Option<BaseValue> {
            Some(BaseValue::String(raw.to_string()))
        }
        let mut constructor = Constructor::default();
        constructor.register_scalar("!num", ValueKind::Int, parse_as_string);
        let err = constructor.load("!num 12").unwrap_err();
        assert!(matches!(
            err,
            Error::Construct(ConstructError::ScalarParse(ScalarParseError {
                kind: ScalarKind::Custom,
                ..
            }))
        ));
    }

    #[test]
    fn test_scalar_from_value_key() {
        let doc = load("count: !!int {=: 5, unit: items}\n").unwrap();
        let count = doc.get("count").unwrap();
        assert_eq!(count, 5i64);
        assert_eq!(count.span().start().column, 13);
    }

    #[test]
    fn test_value_key_in_plain_mapping_is_text() {
        let doc = load("{=: 5}").unwrap();
        assert_eq!(doc.get("=").unwrap(), 5i64);
    }

    #[test]
    fn test_mapping_without_value_key_is_not_a_scalar() {
        let err = load("count: !!int {unit: items}\n").unwrap_err();
        let Error::Construct(ConstructError::Structure(err)) = err else {
            panic!("expected a structure error, got {err:?}");
        };
        assert_eq!(err.expected, "a scalar node");
        assert_eq!(err.found, "a mapping node");
    }
}
