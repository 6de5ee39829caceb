//! The provenance-carrying value model.
//!
//! [`MarkedValue`] is a closed set of variants, one per YAML kind. Each variant
//! pairs its payload with a [`Span`]. Equality, hashing, ordering, truthiness
//! and formatting are those of the plain value; spans never take part.

use crate::collections::{recursion, MarkedMap, MarkedPairs, MarkedSeq, MarkedSet};
use crate::marked::Marked;
use crate::timestamp::Timestamp;
use chrono::NaiveDate;
use marked_yaml_source_map::Span;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use serde::ser::{Error as _, SerializeMap, SerializeSeq, SerializeTuple};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The kinds a marked value can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Bytes,
    String,
    Date,
    DateTime,
    Sequence,
    Mapping,
    Set,
    Pairs,
}

impl ValueKind {
    pub const ALL: [ValueKind; 12] = [
        ValueKind::Null,
        ValueKind::Bool,
        ValueKind::Int,
        ValueKind::Float,
        ValueKind::Bytes,
        ValueKind::String,
        ValueKind::Date,
        ValueKind::DateTime,
        ValueKind::Sequence,
        ValueKind::Mapping,
        ValueKind::Set,
        ValueKind::Pairs,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bytes => "bytes",
            ValueKind::String => "string",
            ValueKind::Date => "date",
            ValueKind::DateTime => "datetime",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
            ValueKind::Set => "set",
            ValueKind::Pairs => "pairs",
        }
    }

    pub const fn is_collection(self) -> bool {
        matches!(
            self,
            ValueKind::Sequence | ValueKind::Mapping | ValueKind::Set | ValueKind::Pairs
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A plain scalar value, before it is given a span.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseValue {
    Null,
    Bool(bool),
    Int(BigInt),
    Float(f64),
    Bytes(Vec<u8>),
    String(String),
    Date(NaiveDate),
    DateTime(Timestamp),
}

impl BaseValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            BaseValue::Null => ValueKind::Null,
            BaseValue::Bool(_) => ValueKind::Bool,
            BaseValue::Int(_) => ValueKind::Int,
            BaseValue::Float(_) => ValueKind::Float,
            BaseValue::Bytes(_) => ValueKind::Bytes,
            BaseValue::String(_) => ValueKind::String,
            BaseValue::Date(_) => ValueKind::Date,
            BaseValue::DateTime(_) => ValueKind::DateTime,
        }
    }
}

/// A constructed YAML value together with the span that produced it.
#[derive(Debug, Clone)]
pub enum MarkedValue {
    Null(Marked<()>),
    Bool(Marked<bool>),
    Int(Marked<BigInt>),
    Float(Marked<f64>),
    Bytes(Marked<Vec<u8>>),
    String(Marked<String>),
    Date(Marked<NaiveDate>),
    DateTime(Marked<Timestamp>),
    Sequence(MarkedSeq),
    Mapping(MarkedMap),
    Set(MarkedSet),
    /// Built from `!!omap` and `!!pairs` nodes
    Pairs(MarkedPairs),
}

impl MarkedValue {
    /// Source span of this value.
    ///
    /// Every handle to a collection reports the span of the node that built
    /// it, including handles obtained through aliases.
    pub fn span(&self) -> Span {
        match self {
            MarkedValue::Null(v) => v.span(),
            MarkedValue::Bool(v) => v.span(),
            MarkedValue::Int(v) => v.span(),
            MarkedValue::Float(v) => v.span(),
            MarkedValue::Bytes(v) => v.span(),
            MarkedValue::String(v) => v.span(),
            MarkedValue::Date(v) => v.span(),
            MarkedValue::DateTime(v) => v.span(),
            MarkedValue::Sequence(v) => v.span(),
            MarkedValue::Mapping(v) => v.span(),
            MarkedValue::Set(v) => v.span(),
            MarkedValue::Pairs(v) => v.span(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            MarkedValue::Null(_) => ValueKind::Null,
            MarkedValue::Bool(_) => ValueKind::Bool,
            MarkedValue::Int(_) => ValueKind::Int,
            MarkedValue::Float(_) => ValueKind::Float,
            MarkedValue::Bytes(_) => ValueKind::Bytes,
            MarkedValue::String(_) => ValueKind::String,
            MarkedValue::Date(_) => ValueKind::Date,
            MarkedValue::DateTime(_) => ValueKind::DateTime,
            MarkedValue::Sequence(_) => ValueKind::Sequence,
            MarkedValue::Mapping(_) => ValueKind::Mapping,
            MarkedValue::Set(_) => ValueKind::Set,
            MarkedValue::Pairs(_) => ValueKind::Pairs,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MarkedValue::Null(_))
    }

    /// Truthiness of the plain value: null, false, zero and empty values are
    /// falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            MarkedValue::Null(_) => false,
            MarkedValue::Bool(v) => **v,
            MarkedValue::Int(v) => !v.is_zero(),
            MarkedValue::Float(v) => **v != 0.0,
            MarkedValue::Bytes(v) => !v.is_empty(),
            MarkedValue::String(v) => !v.is_empty(),
            MarkedValue::Date(_) | MarkedValue::DateTime(_) => true,
            MarkedValue::Sequence(v) => !v.is_empty(),
            MarkedValue::Mapping(v) => !v.is_empty(),
            MarkedValue::Set(v) => !v.is_empty(),
            MarkedValue::Pairs(v) => !v.is_empty(),
        }
    }

    pub fn as_bool(&self) -> Option<&Marked<bool>> {
        match self {
            MarkedValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&Marked<BigInt>> {
        match self {
            MarkedValue::Int(v) => Some(v),
            _ => None,
        }
    }

    /// The integer value, if it is an int that fits in an i64.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_int().and_then(|v| v.to_i64())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MarkedValue::Float(v) => Some(**v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MarkedValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            MarkedValue::Bytes(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&Marked<NaiveDate>> {
        match self {
            MarkedValue::Date(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&Marked<Timestamp>> {
        match self {
            MarkedValue::DateTime(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&MarkedSeq> {
        match self {
            MarkedValue::Sequence(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&MarkedMap> {
        match self {
            MarkedValue::Mapping(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&MarkedSet> {
        match self {
            MarkedValue::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_pairs(&self) -> Option<&MarkedPairs> {
        match self {
            MarkedValue::Pairs(v) => Some(v),
            _ => None,
        }
    }

    /// Look up a string key in a mapping.
    pub fn get(&self, key: &str) -> Option<MarkedValue> {
        self.as_mapping().and_then(|map| map.get_str(key))
    }

    /// Item `index` of a sequence.
    pub fn item(&self, index: usize) -> Option<MarkedValue> {
        self.as_sequence().and_then(|seq| seq.get(index))
    }

    /// The plain value of a scalar, without its span. Collections have no
    /// base form and return None.
    pub fn to_base(&self) -> Option<BaseValue> {
        Some(match self {
            MarkedValue::Null(_) => BaseValue::Null,
            MarkedValue::Bool(v) => BaseValue::Bool(**v),
            MarkedValue::Int(v) => BaseValue::Int(v.value().clone()),
            MarkedValue::Float(v) => BaseValue::Float(**v),
            MarkedValue::Bytes(v) => BaseValue::Bytes(v.value().clone()),
            MarkedValue::String(v) => BaseValue::String(v.value().clone()),
            MarkedValue::Date(v) => BaseValue::Date(**v),
            MarkedValue::DateTime(v) => BaseValue::DateTime(**v),
            MarkedValue::Sequence(_)
            | MarkedValue::Mapping(_)
            | MarkedValue::Set(_)
            | MarkedValue::Pairs(_) => return None,
        })
    }

    /// Handle for a reference to this value from inside its own subtree.
    pub(crate) fn back_reference(&self) -> MarkedValue {
        match self {
            MarkedValue::Sequence(v) => MarkedValue::Sequence(v.back_reference()),
            MarkedValue::Mapping(v) => MarkedValue::Mapping(v.back_reference()),
            MarkedValue::Set(v) => MarkedValue::Set(v.back_reference()),
            MarkedValue::Pairs(v) => MarkedValue::Pairs(v.back_reference()),
            scalar => scalar.clone(),
        }
    }

    fn collection_addr(&self) -> Option<usize> {
        match self {
            MarkedValue::Sequence(v) => Some(v.addr()),
            MarkedValue::Mapping(v) => Some(v.addr()),
            MarkedValue::Set(v) => Some(v.addr()),
            MarkedValue::Pairs(v) => Some(v.addr()),
            _ => None,
        }
    }
}

/// NaN equals NaN and 0.0 equals -0.0 so that floats can be mapping keys.
fn float_eq(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn float_bits(value: f64) -> u64 {
    if value.is_nan() {
        f64::NAN.to_bits()
    } else if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

impl PartialEq for MarkedValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MarkedValue::Null(_), MarkedValue::Null(_)) => true,
            (MarkedValue::Bool(a), MarkedValue::Bool(b)) => a == b,
            (MarkedValue::Int(a), MarkedValue::Int(b)) => a == b,
            (MarkedValue::Float(a), MarkedValue::Float(b)) => float_eq(**a, **b),
            (MarkedValue::Bytes(a), MarkedValue::Bytes(b)) => a == b,
            (MarkedValue::String(a), MarkedValue::String(b)) => a == b,
            (MarkedValue::Date(a), MarkedValue::Date(b)) => a == b,
            (MarkedValue::DateTime(a), MarkedValue::DateTime(b)) => a == b,
            (MarkedValue::Sequence(a), MarkedValue::Sequence(b)) => a == b,
            (MarkedValue::Mapping(a), MarkedValue::Mapping(b)) => a == b,
            (MarkedValue::Set(a), MarkedValue::Set(b)) => a == b,
            (MarkedValue::Pairs(a), MarkedValue::Pairs(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for MarkedValue {}

/// Scalars hash exactly like their plain payload. Collections hash by kind
/// only, so filling a collection never changes the hash of a key that refers
/// to it.
impl Hash for MarkedValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            MarkedValue::Null(v) => v.hash(state),
            MarkedValue::Bool(v) => v.hash(state),
            MarkedValue::Int(v) => v.hash(state),
            MarkedValue::Float(v) => float_bits(**v).hash(state),
            MarkedValue::Bytes(v) => v.hash(state),
            MarkedValue::String(v) => v.hash(state),
            MarkedValue::Date(v) => v.hash(state),
            MarkedValue::DateTime(v) => v.hash(state),
            MarkedValue::Sequence(_)
            | MarkedValue::Mapping(_)
            | MarkedValue::Set(_)
            | MarkedValue::Pairs(_) => self.kind().hash(state),
        }
    }
}

/// Values of different kinds are unordered. Sequences and pairs order
/// lexicographically, sets by inclusion; mappings are only comparable when
/// equal.
impl PartialOrd for MarkedValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (MarkedValue::Null(_), MarkedValue::Null(_)) => Some(Ordering::Equal),
            (MarkedValue::Bool(a), MarkedValue::Bool(b)) => a.partial_cmp(b),
            (MarkedValue::Int(a), MarkedValue::Int(b)) => a.partial_cmp(b),
            (MarkedValue::Float(a), MarkedValue::Float(b)) => {
                if float_eq(**a, **b) {
                    Some(Ordering::Equal)
                } else {
                    a.partial_cmp(b)
                }
            }
            (MarkedValue::Bytes(a), MarkedValue::Bytes(b)) => a.partial_cmp(b),
            (MarkedValue::String(a), MarkedValue::String(b)) => a.partial_cmp(b),
            (MarkedValue::Date(a), MarkedValue::Date(b)) => a.partial_cmp(b),
            (MarkedValue::DateTime(a), MarkedValue::DateTime(b)) => a.partial_cmp(b),
            (MarkedValue::Sequence(a), MarkedValue::Sequence(b)) => {
                if a.same_instance(b) {
                    return Some(Ordering::Equal);
                }
                recursion::comparing((a.addr(), b.addr()), || {
                    a.with(|x| b.with(|y| x.partial_cmp(y)))
                })
                .unwrap_or(Some(Ordering::Equal))
            }
            (MarkedValue::Pairs(a), MarkedValue::Pairs(b)) => {
                if a.same_instance(b) {
                    return Some(Ordering::Equal);
                }
                recursion::comparing((a.addr(), b.addr()), || {
                    a.with(|x| b.with(|y| x.partial_cmp(y)))
                })
                .unwrap_or(Some(Ordering::Equal))
            }
            (MarkedValue::Set(a), MarkedValue::Set(b)) => {
                match (a.is_subset(b), b.is_subset(a)) {
                    (true, true) => Some(Ordering::Equal),
                    (true, false) => Some(Ordering::Less),
                    (false, true) => Some(Ordering::Greater),
                    (false, false) => None,
                }
            }
            (MarkedValue::Mapping(a), MarkedValue::Mapping(b)) => {
                (a == b).then_some(Ordering::Equal)
            }
            _ => None,
        }
    }
}

macro_rules! impl_value_comparisons {
    ($($plain:ty => $variant:ident),* $(,)?) => {
        $(
            impl PartialEq<$plain> for MarkedValue {
                fn eq(&self, other: &$plain) -> bool {
                    matches!(self, MarkedValue::$variant(v) if v == other)
                }
            }

            impl PartialEq<MarkedValue> for $plain {
                fn eq(&self, other: &MarkedValue) -> bool {
                    other == self
                }
            }
        )*
    };
}

impl_value_comparisons!(
    bool => Bool,
    () => Null,
    String => String,
    BigInt => Int,
    i64 => Int,
    Vec<u8> => Bytes,
    NaiveDate => Date,
    Timestamp => DateTime,
);

impl PartialEq<f64> for MarkedValue {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, MarkedValue::Float(v) if **v == *other)
    }
}

impl PartialEq<MarkedValue> for f64 {
    fn eq(&self, other: &MarkedValue) -> bool {
        other == self
    }
}

impl PartialEq<str> for MarkedValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for MarkedValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<MarkedValue> for str {
    fn eq(&self, other: &MarkedValue) -> bool {
        other.as_str() == Some(self)
    }
}

impl PartialEq<MarkedValue> for &str {
    fn eq(&self, other: &MarkedValue) -> bool {
        other.as_str() == Some(*self)
    }
}

macro_rules! impl_from_marked {
    ($($plain:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Marked<$plain>> for MarkedValue {
                fn from(value: Marked<$plain>) -> Self {
                    MarkedValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_marked!(
    () => Null,
    bool => Bool,
    BigInt => Int,
    f64 => Float,
    Vec<u8> => Bytes,
    String => String,
    NaiveDate => Date,
    Timestamp => DateTime,
);

/// A string value with an empty span, mostly useful as a lookup key.
impl From<&str> for MarkedValue {
    fn from(value: &str) -> Self {
        MarkedValue::String(Marked::new(value.to_string(), Span::default()))
    }
}

fn fmt_float(value: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if value.is_nan() {
        f.write_str(".nan")
    } else if value.is_infinite() {
        f.write_str(if value > 0.0 { ".inf" } else { "-.inf" })
    } else {
        write!(f, "{value:?}")
    }
}

fn fmt_bytes(value: &[u8], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("b\"")?;
    for byte in value {
        write!(f, "{}", std::ascii::escape_default(*byte))?;
    }
    f.write_str("\"")
}

/// Nested values are written with strings quoted, like a literal.
struct Nested<'a>(&'a MarkedValue);

impl fmt::Display for Nested<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            MarkedValue::String(v) => write!(f, "{:?}", v.as_str()),
            other => fmt::Display::fmt(other, f),
        }
    }
}

impl fmt::Display for MarkedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let addr = match self.collection_addr() {
            None => return self.fmt_scalar(f),
            Some(addr) => addr,
        };
        let shown = recursion::visiting(addr, || self.fmt_collection(f));
        match (shown, self) {
            (Some(result), _) => result,
            (None, MarkedValue::Sequence(_) | MarkedValue::Pairs(_)) => f.write_str("[...]"),
            (None, _) => f.write_str("{...}"),
        }
    }
}

impl MarkedValue {
    fn fmt_scalar(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkedValue::Null(_) => f.write_str("null"),
            MarkedValue::Bool(v) => write!(f, "{v}"),
            MarkedValue::Int(v) => write!(f, "{v}"),
            MarkedValue::Float(v) => fmt_float(**v, f),
            MarkedValue::Bytes(v) => fmt_bytes(v, f),
            MarkedValue::String(v) => f.write_str(v),
            MarkedValue::Date(v) => write!(f, "{v}"),
            MarkedValue::DateTime(v) => write!(f, "{v}"),
            _ => self.fmt_collection(f),
        }
    }

    fn fmt_collection(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkedValue::Sequence(seq) => {
                f.write_str("[")?;
                for (i, item) in seq.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", Nested(&item))?;
                }
                f.write_str("]")
            }
            MarkedValue::Mapping(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", Nested(&key), Nested(&value))?;
                }
                f.write_str("}")
            }
            MarkedValue::Set(set) => {
                f.write_str("{")?;
                for (i, member) in set.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", Nested(&member))?;
                }
                f.write_str("}")
            }
            MarkedValue::Pairs(pairs) => {
                f.write_str("[")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "({}, {})", Nested(&key), Nested(&value))?;
                }
                f.write_str("]")
            }
            _ => self.fmt_scalar(f),
        }
    }
}

/// Serializes the plain value; spans are dropped. Recursive structures are
/// reported as a serializer error.
impl Serialize for MarkedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let addr = match self.collection_addr() {
            None => return self.serialize_scalar(serializer),
            Some(addr) => addr,
        };
        recursion::visiting(addr, || self.serialize_collection(serializer)).unwrap_or_else(|| {
            Err(S::Error::custom(format!(
                "cannot serialize a recursive {} at {}",
                self.kind(),
                self.span()
            )))
        })
    }
}

impl MarkedValue {
    fn serialize_scalar<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MarkedValue::Null(_) => serializer.serialize_unit(),
            MarkedValue::Bool(v) => serializer.serialize_bool(**v),
            MarkedValue::Int(v) => {
                if let Some(n) = v.to_i64() {
                    serializer.serialize_i64(n)
                } else if let Some(n) = v.to_u64() {
                    serializer.serialize_u64(n)
                } else {
                    serializer.serialize_str(&v.to_string())
                }
            }
            MarkedValue::Float(v) => serializer.serialize_f64(**v),
            MarkedValue::Bytes(v) => serializer.serialize_bytes(v),
            MarkedValue::String(v) => serializer.serialize_str(v),
            MarkedValue::Date(v) => serializer.serialize_str(&v.to_string()),
            MarkedValue::DateTime(v) => serializer.serialize_str(&v.to_string()),
            _ => self.serialize_collection(serializer),
        }
    }

    fn serialize_collection<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MarkedValue::Sequence(seq) => {
                let items = seq.to_vec();
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in &items {
                    out.serialize_element(item)?;
                }
                out.end()
            }
            MarkedValue::Mapping(map) => {
                let entries = map.entries();
                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in &entries {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            MarkedValue::Set(set) => {
                let members = set.to_vec();
                let mut out = serializer.serialize_seq(Some(members.len()))?;
                for member in &members {
                    out.serialize_element(member)?;
                }
                out.end()
            }
            MarkedValue::Pairs(pairs) => {
                let pairs = pairs.to_vec();
                let mut out = serializer.serialize_seq(Some(pairs.len()))?;
                for pair in &pairs {
                    out.serialize_element(&Pair(pair))?;
                }
                out.end()
            }
            _ => self.serialize_scalar(serializer),
        }
    }
}

struct Pair<'a>(&'a (MarkedValue, MarkedValue));

impl Serialize for Pair<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_tuple(2)?;
        out.serialize_element(&self.0.0)?;
        out.serialize_element(&self.0.1)?;
        out.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::{IndexMap, IndexSet};
    use marked_yaml_source_map::Position;
    use std::collections::HashMap;
    use std::collections::hash_map::DefaultHasher;

    fn span(offset: usize) -> Span {
        Span::new(
            Position::new(offset, 0, offset),
            Position::new(offset + 2, 0, offset + 2),
        )
    }

    fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn string(s: &str, at: usize) -> MarkedValue {
        MarkedValue::String(Marked::new(s.to_string(), span(at)))
    }

    fn int(n: i64, at: usize) -> MarkedValue {
        MarkedValue::Int(Marked::new(BigInt::from(n), span(at)))
    }

    fn seq(items: Vec<MarkedValue>) -> MarkedValue {
        let seq = MarkedSeq::empty(span(0));
        seq.fill(items);
        MarkedValue::Sequence(seq)
    }

    #[test]
    fn test_equality_is_span_independent() {
        assert_eq!(string("Jane", 0), string("Jane", 30));
        assert_eq!(int(29, 0), int(29, 12));
        assert_ne!(int(29, 0), string("29", 0));
    }

    #[test]
    fn test_hash_is_span_independent_and_plain() {
        assert_eq!(hash_of(&string("Jane", 0)), hash_of(&string("Jane", 30)));
        assert_eq!(hash_of(&string("Jane", 0)), hash_of("Jane".to_string().as_str()));
        assert_eq!(hash_of(&int(7, 0)), hash_of(&BigInt::from(7)));
        let yes = MarkedValue::Bool(Marked::new(true, span(3)));
        assert_eq!(hash_of(&yes), hash_of(&true));
    }

    #[test]
    fn test_float_keys_behave() {
        let nan = MarkedValue::Float(Marked::new(f64::NAN, span(0)));
        assert_eq!(nan, nan.clone());
        let zero = MarkedValue::Float(Marked::new(0.0, span(0)));
        let negative_zero = MarkedValue::Float(Marked::new(-0.0, span(5)));
        assert_eq!(zero, negative_zero);
        assert_eq!(hash_of(&zero), hash_of(&negative_zero));
    }

    #[test]
    fn test_marked_values_work_as_hash_keys() {
        let mut counts = HashMap::new();
        counts.insert(string("admin", 0), 1);
        *counts.entry(string("admin", 40)).or_insert(0) += 1;
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[&string("admin", 99)], 2);
    }

    #[test]
    fn test_identity_sensitive_kinds() {
        let yes = MarkedValue::Bool(Marked::new(true, span(0)));
        let no = MarkedValue::Bool(Marked::new(false, span(0)));
        let null = MarkedValue::Null(Marked::new((), span(0)));

        assert!(yes == true);
        assert!(true == yes);
        assert!(no == false);
        assert!(!no.is_truthy());
        assert!(null == ());
        assert!(() == null);
        assert!(null.is_null());
        assert!(!null.is_truthy());
        assert!(yes != false);
    }

    #[test]
    fn test_truthiness() {
        assert!(!int(0, 0).is_truthy());
        assert!(int(2, 0).is_truthy());
        assert!(!string("", 0).is_truthy());
        assert!(string("x", 0).is_truthy());
        assert!(!seq(vec![]).is_truthy());
        assert!(seq(vec![int(1, 0)]).is_truthy());
        assert!(MarkedValue::Float(Marked::new(f64::NAN, span(0))).is_truthy());
    }

    #[test]
    fn test_plain_comparisons() {
        assert!(string("Jane", 4) == "Jane");
        assert!("Jane" == string("Jane", 4));
        assert!(int(29, 0) == 29i64);
        assert!(MarkedValue::Float(Marked::new(5.6, span(0))) == 5.6);
    }

    #[test]
    fn test_ordering() {
        assert!(int(1, 0) < int(2, 0));
        assert_eq!(int(1, 0).partial_cmp(&string("1", 0)), None);
        assert!(seq(vec![int(1, 0), int(2, 0)]) < seq(vec![int(1, 0), int(3, 0)]));

        let small = MarkedSet::empty(span(0));
        small.fill(IndexSet::from([int(1, 0)]));
        let large = MarkedSet::empty(span(0));
        large.fill(IndexSet::from([int(1, 0), int(2, 0)]));
        assert!(MarkedValue::Set(small) < MarkedValue::Set(large));
    }

    #[test]
    fn test_mapping_equality_ignores_order() {
        let a = MarkedMap::empty(span(0));
        a.fill(IndexMap::from([(string("x", 0), int(1, 0)), (string("y", 0), int(2, 0))]));
        let b = MarkedMap::empty(span(9));
        b.fill(IndexMap::from([(string("y", 3), int(2, 3)), (string("x", 5), int(1, 5))]));
        assert_eq!(MarkedValue::Mapping(a), MarkedValue::Mapping(b));
    }

    #[test]
    fn test_to_base_roundtrip() {
        let base = BaseValue::String("editor".into());
        let marked = string("editor", 7);
        assert_eq!(marked.to_base(), Some(base));
        assert_eq!(seq(vec![]).to_base(), None);
    }

    #[test]
    fn test_display() {
        let list = seq(vec![string("admin", 0), int(3, 0)]);
        assert_eq!(list.to_string(), r#"["admin", 3]"#);
        assert_eq!(string("plain", 0).to_string(), "plain");
        assert_eq!(MarkedValue::Float(Marked::new(f64::INFINITY, span(0))).to_string(), ".inf");
        assert_eq!(MarkedValue::Bytes(Marked::new(b"hi\n".to_vec(), span(0))).to_string(), r#"b"hi\n""#);
    }

    #[test]
    fn test_display_recursive() {
        let seq = MarkedSeq::empty(span(0));
        seq.fill(vec![int(1, 0), MarkedValue::Sequence(seq.back_reference())]);
        assert_eq!(MarkedValue::Sequence(seq).to_string(), "[1, [...]]");
    }

    #[test]
    fn test_serialize_plain_json() {
        let map = MarkedMap::empty(span(0));
        map.fill(IndexMap::from([
            (string("name", 0), string("Jane", 6)),
            (string("age", 13), int(29, 18)),
            (string("roles", 21), seq(vec![string("admin", 30)])),
        ]));
        let json = serde_json::to_string(&MarkedValue::Mapping(map)).unwrap();
        assert_eq!(json, r#"{"name":"Jane","age":29,"roles":["admin"]}"#);
    }

    #[test]
    fn test_serialize_recursive_fails() {
        let seq = MarkedSeq::empty(span(0));
        seq.fill(vec![MarkedValue::Sequence(seq.back_reference())]);
        assert!(serde_json::to_string(&MarkedValue::Sequence(seq)).is_err());
    }
}
