//! Builds node graphs from YAML text using `yaml-rust2` events.
//!
//! The parser reports where each node starts. Where it ends is recovered
//! from the source: quoted scalars end after their closing quote, plain and
//! block scalars after their last content character, flow collections after
//! their closing bracket and block collections at the end of their last
//! child.

use crate::error::ComposeError;
use crate::node::{NodeGraph, NodeId, NodeKind, ScalarStyle};
use crate::resolver;
use crate::schema::{self, Schema};
use marked_yaml_source_map::{LineIndex, Span};
use std::collections::HashMap;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Compose the single document in `content`.
///
/// Empty input gives an empty graph. More than one document is an error;
/// use [`compose_all`] for streams.
pub fn compose(content: &str, schema: Schema) -> Result<NodeGraph, ComposeError> {
    let mut documents = compose_documents(content, schema)?;
    if let Some(extra) = documents.get(1) {
        return Err(ComposeError::Syntax {
            message: "expected a single document in the stream, but found another document"
                .into(),
            position: LineIndex::new(content).position_clamped(extra.start),
        });
    }
    Ok(documents
        .pop()
        .map(|document| document.graph)
        .unwrap_or_default())
}

/// Compose every document of a stream, in order.
pub fn compose_all(content: &str, schema: Schema) -> Result<Vec<NodeGraph>, ComposeError> {
    let documents = compose_documents(content, schema)?;
    Ok(documents.into_iter().map(|document| document.graph).collect())
}

fn compose_documents(content: &str, schema: Schema) -> Result<Vec<Document>, ComposeError> {
    let mut parser = Parser::new_from_str(content);
    let mut composer = Composer::new(content, schema);

    if let Err(err) = parser.load(&mut composer, true) {
        return Err(ComposeError::Syntax {
            message: err.info().to_string(),
            position: composer.index.position_clamped(err.marker().index()),
        });
    }

    composer.finish()
}

struct Document {
    /// Character offset where the document begins
    start: usize,
    graph: NodeGraph,
}

/// A collection whose end event has not arrived yet.
struct Frame {
    id: NodeId,
    kind: NodeKind,
    start: usize,
    /// Opened with `[` or `{`
    flow: bool,
    pending_key: Option<NodeId>,
    last_end: usize,
}

struct Composer {
    chars: Vec<char>,
    index: LineIndex,
    schema: Schema,
    graph: NodeGraph,
    stack: Vec<Frame>,
    anchors: HashMap<usize, NodeId>,
    document_start: usize,
    documents: Vec<Document>,
    error: Option<ComposeError>,
}

impl Composer {
    fn new(content: &str, schema: Schema) -> Self {
        Composer {
            chars: content.chars().collect(),
            index: LineIndex::new(content),
            schema,
            graph: NodeGraph::new(),
            stack: Vec::new(),
            anchors: HashMap::new(),
            document_start: 0,
            documents: Vec::new(),
            error: None,
        }
    }

    fn finish(self) -> Result<Vec<Document>, ComposeError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.documents),
        }
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(
            self.index.position_clamped(start),
            self.index.position_clamped(end),
        )
    }

    fn handle(&mut self, event: Event, at: usize) -> Result<(), ComposeError> {
        match event {
            Event::Nothing | Event::StreamStart | Event::StreamEnd => {}

            Event::DocumentStart => {
                self.graph = NodeGraph::new();
                self.stack.clear();
                self.anchors.clear();
                self.document_start = at;
            }

            Event::DocumentEnd => {
                let graph = std::mem::take(&mut self.graph);
                tracing::trace!(nodes = graph.len(), start = at, "composed document");
                self.documents.push(Document {
                    start: self.document_start,
                    graph,
                });
            }

            Event::Scalar(value, style, anchor, tag) => {
                let style = scalar_style(style);
                let end = self.scalar_end(at, &value, style)?;
                let tag = self.tag(tag.as_ref(), NodeKind::Scalar, &value, style);
                let span = self.span(at, end);
                let id = self.graph.add_scalar(tag, value, style, span);
                self.anchor(anchor, id);
                self.attach(id, at, end);
            }

            Event::SequenceStart(anchor, tag) => {
                let tag = self.tag(tag.as_ref(), NodeKind::Sequence, "", ScalarStyle::Plain);
                let span = self.span(at, at);
                let id = self.graph.add_sequence(tag, span);
                self.anchor(anchor, id);
                self.open(id, NodeKind::Sequence, at, '[');
            }

            Event::MappingStart(anchor, tag) => {
                let tag = self.tag(tag.as_ref(), NodeKind::Mapping, "", ScalarStyle::Plain);
                let span = self.span(at, at);
                let id = self.graph.add_mapping(tag, span);
                self.anchor(anchor, id);
                self.open(id, NodeKind::Mapping, at, '{');
            }

            Event::SequenceEnd => self.close(at, ']'),
            Event::MappingEnd => self.close(at, '}'),

            Event::Alias(anchor) => {
                let id = self.anchors.get(&anchor).copied().ok_or_else(|| {
                    ComposeError::UndefinedAlias {
                        position: self.index.position_clamped(at),
                    }
                })?;
                let end = self.alias_end(at);
                self.attach(id, at, end);
            }
        }
        Ok(())
    }

    fn tag(&self, tag: Option<&Tag>, kind: NodeKind, value: &str, style: ScalarStyle) -> String {
        match tag.map(|t| schema::expand_tag(&t.handle, &t.suffix)) {
            None => resolver::resolve(self.schema, kind, value, style).to_string(),
            // `!` on a scalar means "not implicitly typed": always a string
            Some(tag) if tag == schema::NON_SPECIFIC => {
                resolver::resolve(self.schema, kind, value, ScalarStyle::DoubleQuoted).to_string()
            }
            Some(tag) => tag,
        }
    }

    fn anchor(&mut self, anchor: usize, id: NodeId) {
        if anchor > 0 {
            self.anchors.insert(anchor, id);
        }
    }

    fn open(&mut self, id: NodeId, kind: NodeKind, at: usize, opener: char) {
        self.stack.push(Frame {
            id,
            kind,
            start: at,
            flow: self.chars.get(at) == Some(&opener),
            pending_key: None,
            last_end: at,
        });
    }

    fn close(&mut self, at: usize, closer: char) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let end = if frame.flow && self.chars.get(at) == Some(&closer) {
            at + 1
        } else {
            frame.last_end
        };
        let span = self.span(frame.start, end);
        self.graph.set_span(frame.id, span);
        self.attach(frame.id, frame.start, end);
    }

    /// Hand a finished node to its parent, or make it the root.
    ///
    /// Block mappings are announced at their first `:`, so a block
    /// collection starts no later than its first child.
    fn attach(&mut self, id: NodeId, start: usize, end: usize) {
        let Some(frame) = self.stack.last_mut() else {
            self.graph.set_root(id);
            return;
        };
        if !frame.flow {
            frame.start = frame.start.min(start);
        }
        frame.last_end = frame.last_end.max(end);
        match frame.kind {
            NodeKind::Mapping => match frame.pending_key.take() {
                Some(key) => {
                    self.graph.push_entry(frame.id, key, id);
                }
                None => frame.pending_key = Some(id),
            },
            _ => {
                self.graph.push_item(frame.id, id);
            }
        }
    }

    /// Block scalars are reported at their first content character, so
    /// every style except quoted ones is located by walking its words.
    fn scalar_end(&self, at: usize, value: &str, style: ScalarStyle) -> Result<usize, ComposeError> {
        let end = match style {
            ScalarStyle::DoubleQuoted => self.quoted_end(at, '"'),
            ScalarStyle::SingleQuoted => self.quoted_end(at, '\''),
            // Empty nodes are reported as a plain `~` that is not in the text
            ScalarStyle::Plain if value == "~" && self.chars.get(at) != Some(&'~') => Some(at),
            ScalarStyle::Plain | ScalarStyle::Literal | ScalarStyle::Folded => {
                self.walk_tokens(at, value)
            }
        };
        end.ok_or_else(|| ComposeError::UnlocatedScalar {
            position: self.index.position_clamped(at),
        })
    }

    /// End of a quoted scalar whose opening quote is at `at`.
    fn quoted_end(&self, at: usize, quote: char) -> Option<usize> {
        if self.chars.get(at) != Some(&quote) {
            return None;
        }
        let mut i = at + 1;
        while let Some(c) = self.chars.get(i) {
            match (*c, quote) {
                ('\\', '"') => i += 2,
                ('\'', '\'') if self.chars.get(i + 1) == Some(&'\'') => i += 2,
                (c, q) if c == q => return Some(i + 1),
                _ => i += 1,
            }
        }
        None
    }

    /// Match the whitespace-separated words of `value` against the source
    /// starting at `cursor`; returns the offset after the last word.
    fn walk_tokens(&self, mut cursor: usize, value: &str) -> Option<usize> {
        for word in value.split_whitespace() {
            while self.chars.get(cursor).is_some_and(|c| c.is_whitespace()) {
                cursor += 1;
            }
            for expected in word.chars() {
                if self.chars.get(cursor) != Some(&expected) {
                    return None;
                }
                cursor += 1;
            }
        }
        Some(cursor)
    }

    fn alias_end(&self, at: usize) -> usize {
        let mut end = at + 1;
        while self
            .chars
            .get(end)
            .is_some_and(|c| !c.is_whitespace() && !",[]{}".contains(*c))
        {
            end += 1;
        }
        end
    }
}

impl MarkedEventReceiver for Composer {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.handle(ev, mark.index()) {
            self.error = Some(err);
        }
    }
}

fn scalar_style(style: TScalarStyle) -> ScalarStyle {
    match style {
        TScalarStyle::Plain => ScalarStyle::Plain,
        TScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
        TScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
        TScalarStyle::Literal => ScalarStyle::Literal,
        _ => ScalarStyle::Folded,
    }
}
