//! The wrapper registry.
//!
//! Maps each value kind to the strategy that gives it a span. Strategies are
//! synthesized the first time a kind is seen and cached after that, so the
//! cost of synthesis is paid once per kind per registry.

use crate::collections::{MarkedMap, MarkedPairs, MarkedSeq, MarkedSet};
use crate::error::WrapError;
use crate::marked::Marked;
use crate::schema::Schema;
use crate::value::{BaseValue, MarkedValue, ValueKind};
use marked_yaml_source_map::Span;
use std::collections::HashMap;

/// How a value of one kind is turned into its marked form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// Pair a scalar payload with its span
    Scalar(ValueKind),
    /// Allocate an empty shared collection to be filled later
    Collection(ValueKind),
}

impl Strategy {
    fn apply_scalar(self, value: BaseValue, span: Span) -> MarkedValue {
        debug_assert_eq!(self, Strategy::Scalar(value.kind()));
        match value {
            BaseValue::Null => MarkedValue::Null(Marked::new((), span)),
            BaseValue::Bool(v) => MarkedValue::Bool(Marked::new(v, span)),
            BaseValue::Int(v) => MarkedValue::Int(Marked::new(v, span)),
            BaseValue::Float(v) => MarkedValue::Float(Marked::new(v, span)),
            BaseValue::Bytes(v) => MarkedValue::Bytes(Marked::new(v, span)),
            BaseValue::String(v) => MarkedValue::String(Marked::new(v, span)),
            BaseValue::Date(v) => MarkedValue::Date(Marked::new(v, span)),
            BaseValue::DateTime(v) => MarkedValue::DateTime(Marked::new(v, span)),
        }
    }

    fn apply_empty(self, span: Span) -> Option<MarkedValue> {
        let Strategy::Collection(kind) = self else {
            return None;
        };
        Some(match kind {
            ValueKind::Sequence => MarkedValue::Sequence(MarkedSeq::empty(span)),
            ValueKind::Mapping => MarkedValue::Mapping(MarkedMap::empty(span)),
            ValueKind::Set => MarkedValue::Set(MarkedSet::empty(span)),
            ValueKind::Pairs => MarkedValue::Pairs(MarkedPairs::empty(span)),
            _ => return None,
        })
    }
}

/// Per-driver cache of wrapping strategies.
///
/// Not shared between threads; each driver owns one.
#[derive(Debug)]
pub struct Registry {
    schema: Schema,
    strategies: HashMap<ValueKind, Strategy>,
    synthesized: usize,
}

impl Registry {
    pub fn new(schema: Schema) -> Self {
        Registry {
            schema,
            strategies: HashMap::new(),
            synthesized: 0,
        }
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Attach `span` to a plain scalar value.
    pub fn wrap(&mut self, value: BaseValue, span: Span) -> Result<MarkedValue, WrapError> {
        let strategy = self.strategy(value.kind(), span)?;
        Ok(strategy.apply_scalar(value, span))
    }

    /// Allocate an empty collection of `kind`, ready to be filled.
    pub fn empty(&mut self, kind: ValueKind, span: Span) -> Result<MarkedValue, WrapError> {
        let strategy = self.strategy(kind, span)?;
        strategy
            .apply_empty(span)
            .ok_or(WrapError { kind, span })
    }

    fn strategy(&mut self, kind: ValueKind, span: Span) -> Result<Strategy, WrapError> {
        if let Some(strategy) = self.strategies.get(&kind) {
            return Ok(*strategy);
        }
        let strategy = self.synthesize(kind).ok_or(WrapError { kind, span })?;
        tracing::debug!(kind = %kind, schema = ?self.schema, "synthesized wrapping strategy");
        self.synthesized += 1;
        self.strategies.insert(kind, strategy);
        Ok(strategy)
    }

    fn synthesize(&self, kind: ValueKind) -> Option<Strategy> {
        if !self.schema.supports(kind) {
            return None;
        }
        Some(if kind.is_collection() {
            Strategy::Collection(kind)
        } else {
            Strategy::Scalar(kind)
        })
    }

    /// Forget every cached strategy.
    pub fn clear(&mut self) {
        if !self.strategies.is_empty() {
            tracing::debug!(cached = self.strategies.len(), "clearing wrapper registry");
        }
        self.strategies.clear();
    }

    /// Number of strategies synthesized over the registry's lifetime.
    pub fn synthesized(&self) -> usize {
        self.synthesized
    }

    /// Kinds that currently have a cached strategy, in kind order.
    pub fn cached_kinds(&self) -> Vec<ValueKind> {
        let mut kinds: Vec<ValueKind> = self.strategies.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new(Schema::default())
    }
}
