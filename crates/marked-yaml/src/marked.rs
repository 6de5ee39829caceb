//! Span-carrying wrapper for scalar values.
//!
//! `Marked<T>` pairs a plain value with the [`Span`] it was read from. All
//! value semantics (equality, hashing, ordering, formatting) are those of `T`;
//! the span is only reachable through [`Marked::span`].
//!
//! Booleans and null get no special identity treatment: a `Marked<bool>`
//! compares equal to the plain `bool` in both directions, and `Marked<()>`
//! equals `()`. Code that needs pointer identity for those values has to use
//! value equality instead.

use marked_yaml_source_map::Span;
use num_bigint::BigInt;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr, BitXor, Deref, Not};

use crate::timestamp::Timestamp;
use chrono::NaiveDate;

/// A plain value plus the source span that produced it.
#[derive(Debug, Clone, Copy)]
pub struct Marked<T> {
    value: T,
    span: Span,
}

impl<T> Marked<T> {
    pub const fn new(value: T, span: Span) -> Self {
        Marked { value, span }
    }

    pub const fn span(&self) -> Span {
        self.span
    }

    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Drop the span and return the plain value.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Same value, different provenance.
    pub fn with_span(self, span: Span) -> Self {
        Marked { span, ..self }
    }
}

impl<T> Deref for Marked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> AsRef<T> for Marked<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

impl<T: PartialEq> PartialEq for Marked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Marked<T> {}

impl<T: Hash> Hash for Marked<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: PartialOrd> PartialOrd for Marked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl<T: Ord> Ord for Marked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T: fmt::Display> fmt::Display for Marked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// Comparisons between a marked value and its plain counterpart, both ways.
macro_rules! impl_plain_comparisons {
    ($($plain:ty),* $(,)?) => {
        $(
            impl PartialEq<$plain> for Marked<$plain> {
                fn eq(&self, other: &$plain) -> bool {
                    self.value == *other
                }
            }

            impl PartialEq<Marked<$plain>> for $plain {
                fn eq(&self, other: &Marked<$plain>) -> bool {
                    *self == other.value
                }
            }

            impl PartialOrd<$plain> for Marked<$plain> {
                fn partial_cmp(&self, other: &$plain) -> Option<Ordering> {
                    self.value.partial_cmp(other)
                }
            }

            impl PartialOrd<Marked<$plain>> for $plain {
                fn partial_cmp(&self, other: &Marked<$plain>) -> Option<Ordering> {
                    self.partial_cmp(&other.value)
                }
            }
        )*
    };
}

impl_plain_comparisons!(bool, (), f64, String, BigInt, Vec<u8>, NaiveDate, Timestamp);

impl PartialEq<str> for Marked<String> {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}

impl PartialEq<&str> for Marked<String> {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}

impl PartialEq<Marked<String>> for str {
    fn eq(&self, other: &Marked<String>) -> bool {
        self == other.value
    }
}

impl PartialEq<Marked<String>> for &str {
    fn eq(&self, other: &Marked<String>) -> bool {
        *self == other.value
    }
}

impl PartialEq<i64> for Marked<BigInt> {
    fn eq(&self, other: &i64) -> bool {
        self.value == BigInt::from(*other)
    }
}

impl PartialEq<Marked<BigInt>> for i64 {
    fn eq(&self, other: &Marked<BigInt>) -> bool {
        BigInt::from(*self) == other.value
    }
}

impl PartialEq<[u8]> for Marked<Vec<u8>> {
    fn eq(&self, other: &[u8]) -> bool {
        self.value.as_slice() == other
    }
}

impl PartialEq<&[u8]> for Marked<Vec<u8>> {
    fn eq(&self, other: &&[u8]) -> bool {
        self.value.as_slice() == *other
    }
}

// Boolean logic on marked booleans stays marked. The result carries the span
// of the right-hand operand when that operand is marked.

impl BitAnd for Marked<bool> {
    type Output = Marked<bool>;

    fn bitand(self, rhs: Marked<bool>) -> Marked<bool> {
        Marked::new(self.value & rhs.value, rhs.span)
    }
}

impl BitOr for Marked<bool> {
    type Output = Marked<bool>;

    fn bitor(self, rhs: Marked<bool>) -> Marked<bool> {
        Marked::new(self.value | rhs.value, rhs.span)
    }
}

impl BitXor for Marked<bool> {
    type Output = Marked<bool>;

    fn bitxor(self, rhs: Marked<bool>) -> Marked<bool> {
        Marked::new(self.value ^ rhs.value, rhs.span)
    }
}

impl BitAnd<bool> for Marked<bool> {
    type Output = Marked<bool>;

    fn bitand(self, rhs: bool) -> Marked<bool> {
        Marked::new(self.value & rhs, self.span)
    }
}

impl BitOr<bool> for Marked<bool> {
    type Output = Marked<bool>;

    fn bitor(self, rhs: bool) -> Marked<bool> {
        Marked::new(self.value | rhs, self.span)
    }
}

impl BitXor<bool> for Marked<bool> {
    type Output = Marked<bool>;

    fn bitxor(self, rhs: bool) -> Marked<bool> {
        Marked::new(self.value ^ rhs, self.span)
    }
}

impl BitAnd<Marked<bool>> for bool {
    type Output = Marked<bool>;

    fn bitand(self, rhs: Marked<bool>) -> Marked<bool> {
        Marked::new(self & rhs.value, rhs.span)
    }
}

impl BitOr<Marked<bool>> for bool {
    type Output = Marked<bool>;

    fn bitor(self, rhs: Marked<bool>) -> Marked<bool> {
        Marked::new(self | rhs.value, rhs.span)
    }
}

impl BitXor<Marked<bool>> for bool {
    type Output = Marked<bool>;

    fn bitxor(self, rhs: Marked<bool>) -> Marked<bool> {
        Marked::new(self ^ rhs.value, rhs.span)
    }
}

impl Not for Marked<bool> {
    type Output = Marked<bool>;

    fn not(self) -> Marked<bool> {
        Marked::new(!self.value, self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marked_yaml_source_map::Position;
    use std::collections::hash_map::DefaultHasher;

    fn span(offset: usize) -> Span {
        Span::new(
            Position::new(offset, 0, offset),
            Position::new(offset + 1, 0, offset + 1),
        )
    }

    fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equality_ignores_span() {
        assert_eq!(Marked::new(29, span(0)), Marked::new(29, span(40)));
        assert_ne!(Marked::new(29, span(0)), Marked::new(30, span(0)));
    }

    #[test]
    fn test_hash_matches_plain_value() {
        let a = Marked::new(String::from("Jane"), span(1));
        let b = Marked::new(String::from("Jane"), span(9));
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(hash_of(&a), hash_of(&String::from("Jane")));
    }

    #[test]
    fn test_bool_compares_with_plain_both_ways() {
        let yes = Marked::new(true, span(0));
        let no = Marked::new(false, span(1));
        assert!(yes == true);
        assert!(true == yes);
        assert!(no == false);
        assert!(false == no);
        assert!(!*no);
    }

    #[test]
    fn test_null_compares_with_unit() {
        let null = Marked::new((), span(0));
        assert!(null == ());
        assert!(() == null);
    }

    #[test]
    fn test_bool_ops_stay_marked() {
        let a = Marked::new(true, span(0));
        let b = Marked::new(false, span(5));

        let and = a & b;
        assert_eq!(and, false);
        assert_eq!(and.span(), span(5));

        let or = a | b;
        assert_eq!(or, true);

        let xor = a ^ b;
        assert_eq!(xor, true);
        assert_eq!(xor.span(), span(5));

        let mixed = true & b;
        assert_eq!(mixed, false);
        assert_eq!(mixed.span(), span(5));

        let negated = !a;
        assert_eq!(negated, false);
        assert_eq!(negated.span(), span(0));
    }

    #[test]
    fn test_ordering_ignores_span() {
        let small = Marked::new(BigInt::from(1), span(30));
        let large = Marked::new(BigInt::from(2), span(0));
        assert!(small < large);
        assert!(Marked::new(1.5, span(0)) < 2.0);
    }

    #[test]
    fn test_deref_gives_plain_operations() {
        let n = Marked::new(BigInt::from(40), span(0));
        assert_eq!(&*n + BigInt::from(2), BigInt::from(42));

        let s = Marked::new(String::from("editor"), span(0));
        assert!(s.starts_with("ed"));
        assert_eq!(s, "editor");
        assert_eq!(s.to_string(), "editor");
    }

    #[test]
    fn test_into_inner_roundtrip() {
        let value = vec![1u8, 2, 3];
        let marked = Marked::new(value.clone(), span(2));
        assert_eq!(marked.into_inner(), value);
    }
}
