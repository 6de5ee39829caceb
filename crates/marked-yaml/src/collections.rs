//! Shared, span-carrying collection handles.
//!
//! Collections are built in two phases: an empty handle is created first and
//! made visible to the rest of the construction pass, then filled once its
//! children exist. A child that refers back to a collection still being built
//! receives a non-owning handle to the same instance, so self-referential
//! documents neither recurse forever nor leak reference cycles.
//!
//! Once construction returns, collections are logically frozen: the public API
//! is read-only.

use crate::value::MarkedValue;
use indexmap::{IndexMap, IndexSet};
use marked_yaml_source_map::Span;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Items of a YAML sequence.
pub type MarkedSeq = Shared<Vec<MarkedValue>>;

/// Entries of a YAML mapping in insertion order.
pub type MarkedMap = Shared<IndexMap<MarkedValue, MarkedValue>>;

/// Members of a YAML set in insertion order.
pub type MarkedSet = Shared<IndexSet<MarkedValue>>;

/// Key/value tuples of an omap or pairs node; duplicates are kept.
pub type MarkedPairs = Shared<Vec<(MarkedValue, MarkedValue)>>;

struct Inner<T> {
    data: RefCell<T>,
}

enum Link<T> {
    /// Keeps the collection alive
    Owner(Rc<Inner<T>>),
    /// Back-reference to an enclosing collection
    Back(Weak<Inner<T>>),
}

/// Handle to a collection built during construction.
///
/// Cloning a handle never copies the contents; all clones see the same
/// instance (see [`Shared::same_instance`]).
pub struct Shared<T> {
    span: Span,
    link: Link<T>,
}

impl<T: Default> Shared<T> {
    /// Create an empty collection. Contents are supplied later with `fill`.
    pub(crate) fn empty(span: Span) -> Self {
        Shared {
            span,
            link: Link::Owner(Rc::new(Inner {
                data: RefCell::new(T::default()),
            })),
        }
    }

    /// Run `f` against the contents.
    ///
    /// A back-reference whose owner has been dropped reads as empty.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self.upgrade() {
            Some(inner) => {
                let data = inner.data.borrow();
                f(&data)
            }
            None => f(&T::default()),
        }
    }
}

impl<T> Shared<T> {
    pub fn span(&self) -> Span {
        self.span
    }

    /// Check whether two handles point at the same collection instance.
    pub fn same_instance(&self, other: &Shared<T>) -> bool {
        std::ptr::eq(self.as_ptr(), other.as_ptr())
    }

    /// True for handles created for a reference back into an enclosing
    /// collection.
    pub fn is_back_reference(&self) -> bool {
        matches!(self.link, Link::Back(_))
    }

    /// True when this is a back-reference whose owner no longer exists.
    pub fn is_dangling(&self) -> bool {
        match &self.link {
            Link::Owner(_) => false,
            Link::Back(weak) => weak.strong_count() == 0,
        }
    }

    /// Replace the contents; only used while the collection is being built.
    pub(crate) fn fill(&self, contents: T) {
        if let Some(inner) = self.upgrade() {
            *inner.data.borrow_mut() = contents;
        }
    }

    /// A non-owning handle to the same instance.
    pub(crate) fn back_reference(&self) -> Shared<T> {
        let weak = match &self.link {
            Link::Owner(rc) => Rc::downgrade(rc),
            Link::Back(weak) => weak.clone(),
        };
        Shared {
            span: self.span,
            link: Link::Back(weak),
        }
    }

    fn upgrade(&self) -> Option<Rc<Inner<T>>> {
        match &self.link {
            Link::Owner(rc) => Some(Rc::clone(rc)),
            Link::Back(weak) => weak.upgrade(),
        }
    }

    fn as_ptr(&self) -> *const Inner<T> {
        match &self.link {
            Link::Owner(rc) => Rc::as_ptr(rc),
            Link::Back(weak) => weak.as_ptr(),
        }
    }

    pub(crate) fn addr(&self) -> usize {
        self.as_ptr() as usize
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        let link = match &self.link {
            Link::Owner(rc) => Link::Owner(Rc::clone(rc)),
            Link::Back(weak) => Link::Back(weak.clone()),
        };
        Shared {
            span: self.span,
            link,
        }
    }
}

impl<T: PartialEq + Default> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.same_instance(other) {
            return true;
        }
        recursion::comparing((self.addr(), other.addr()), || {
            self.with(|a| other.with(|b| a == b))
        })
        .unwrap_or(true)
    }
}

impl<T: fmt::Debug + Default> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = recursion::visiting(self.addr(), || {
            self.with(|data| {
                f.debug_struct("Shared")
                    .field("span", &self.span)
                    .field("data", data)
                    .finish()
            })
        });
        match shown {
            Some(result) => result,
            None => f.write_str("<recursive>"),
        }
    }
}

impl MarkedSeq {
    pub fn len(&self) -> usize {
        self.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<MarkedValue> {
        self.with(|items| items.get(index).cloned())
    }

    /// Snapshot of the items.
    pub fn to_vec(&self) -> Vec<MarkedValue> {
        self.with(Vec::clone)
    }

    pub fn iter(&self) -> std::vec::IntoIter<MarkedValue> {
        self.to_vec().into_iter()
    }
}

impl MarkedMap {
    pub fn len(&self) -> usize {
        self.with(IndexMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &MarkedValue) -> Option<MarkedValue> {
        self.with(|entries| entries.get(key).cloned())
    }

    /// Look up a string key.
    pub fn get_str(&self, key: &str) -> Option<MarkedValue> {
        self.get(&MarkedValue::from(key))
    }

    pub fn contains_key(&self, key: &MarkedValue) -> bool {
        self.with(|entries| entries.contains_key(key))
    }

    /// The stored key equal to `key`, with its own span.
    pub fn get_key(&self, key: &MarkedValue) -> Option<MarkedValue> {
        self.with(|entries| entries.get_key_value(key).map(|(k, _)| k.clone()))
    }

    pub fn keys(&self) -> Vec<MarkedValue> {
        self.with(|entries| entries.keys().cloned().collect())
    }

    pub fn values(&self) -> Vec<MarkedValue> {
        self.with(|entries| entries.values().cloned().collect())
    }

    /// Snapshot of the entries in insertion order.
    pub fn entries(&self) -> Vec<(MarkedValue, MarkedValue)> {
        self.with(|entries| {
            entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
    }

    pub fn iter(&self) -> std::vec::IntoIter<(MarkedValue, MarkedValue)> {
        self.entries().into_iter()
    }
}

impl MarkedSet {
    pub fn len(&self) -> usize {
        self.with(IndexSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, value: &MarkedValue) -> bool {
        self.with(|members| members.contains(value))
    }

    pub fn to_vec(&self) -> Vec<MarkedValue> {
        self.with(|members| members.iter().cloned().collect())
    }

    pub fn iter(&self) -> std::vec::IntoIter<MarkedValue> {
        self.to_vec().into_iter()
    }

    /// True when every member of `self` is also in `other`.
    pub fn is_subset(&self, other: &MarkedSet) -> bool {
        if self.same_instance(other) {
            return true;
        }
        self.with(|a| other.with(|b| a.is_subset(b)))
    }
}

impl MarkedPairs {
    pub fn len(&self) -> usize {
        self.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<(MarkedValue, MarkedValue)> {
        self.with(|pairs| pairs.get(index).cloned())
    }

    pub fn to_vec(&self) -> Vec<(MarkedValue, MarkedValue)> {
        self.with(Vec::clone)
    }

    pub fn iter(&self) -> std::vec::IntoIter<(MarkedValue, MarkedValue)> {
        self.to_vec().into_iter()
    }
}

/// Cycle guards for walks over possibly self-referential collections.
///
/// Each guard tracks the collections currently on the walk's stack for the
/// running thread. Re-entering one of them returns None instead of
/// descending again.
pub(crate) mod recursion {
    use std::cell::RefCell;

    thread_local! {
        static VISITING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
        static COMPARING: RefCell<Vec<(usize, usize)>> = const { RefCell::new(Vec::new()) };
    }

    struct Visit;

    impl Drop for Visit {
        fn drop(&mut self) {
            VISITING.with(|stack| {
                stack.borrow_mut().pop();
            });
        }
    }

    struct Compare;

    impl Drop for Compare {
        fn drop(&mut self) {
            COMPARING.with(|stack| {
                stack.borrow_mut().pop();
            });
        }
    }

    pub(crate) fn visiting<R>(addr: usize, f: impl FnOnce() -> R) -> Option<R> {
        let entered = VISITING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&addr) {
                false
            } else {
                stack.push(addr);
                true
            }
        });
        if !entered {
            return None;
        }
        let _visit = Visit;
        Some(f())
    }

    /// Callers treat None as "equal": pairs already under comparison are
    /// assumed equal, which makes equality of recursive structures terminate.
    pub(crate) fn comparing<R>(pair: (usize, usize), f: impl FnOnce() -> R) -> Option<R> {
        let entered = COMPARING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&pair) {
                false
            } else {
                stack.push(pair);
                true
            }
        });
        if !entered {
            return None;
        }
        let _compare = Compare;
        Some(f())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marked::Marked;
    use num_bigint::BigInt;

    fn int(n: i64) -> MarkedValue {
        MarkedValue::Int(Marked::new(BigInt::from(n), Span::default()))
    }

    #[test]
    fn test_fill_after_creation() {
        let seq = MarkedSeq::empty(Span::default());
        assert!(seq.is_empty());

        let alias = seq.clone();
        seq.fill(vec![int(1), int(2)]);
        assert_eq!(alias.len(), 2);
        assert!(alias.same_instance(&seq));
    }

    #[test]
    fn test_back_reference_sees_contents() {
        let seq = MarkedSeq::empty(Span::default());
        let back = seq.back_reference();
        assert!(back.is_back_reference());
        assert!(!back.is_dangling());

        seq.fill(vec![int(7)]);
        assert_eq!(back.get(0), Some(int(7)));
        assert!(back.same_instance(&seq));
    }

    #[test]
    fn test_dangling_back_reference_reads_empty() {
        let seq = MarkedSeq::empty(Span::default());
        seq.fill(vec![int(1)]);
        let back = seq.back_reference();
        drop(seq);

        assert!(back.is_dangling());
        assert!(back.is_empty());
    }

    #[test]
    fn test_equality_is_structural() {
        let a = MarkedSeq::empty(Span::default());
        let b = MarkedSeq::empty(Span::default());
        a.fill(vec![int(1), int(2)]);
        b.fill(vec![int(1), int(2)]);
        assert_eq!(a, b);
        assert!(!a.same_instance(&b));

        b.fill(vec![int(2), int(1)]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_self_containing_sequences_compare() {
        let a = MarkedSeq::empty(Span::default());
        a.fill(vec![int(1), MarkedValue::Sequence(a.back_reference())]);
        let b = MarkedSeq::empty(Span::default());
        b.fill(vec![int(1), MarkedValue::Sequence(b.back_reference())]);

        assert_eq!(a, a.clone());
        assert_eq!(a, b);
    }

    #[test]
    fn test_debug_marks_recursion() {
        let a = MarkedSeq::empty(Span::default());
        a.fill(vec![MarkedValue::Sequence(a.back_reference())]);
        assert!(format!("{a:?}").contains("<recursive>"));
    }

    #[test]
    fn test_map_lookup_by_str() {
        let map = MarkedMap::empty(Span::default());
        let mut entries = IndexMap::new();
        entries.insert(MarkedValue::from("age"), int(29));
        map.fill(entries);

        assert_eq!(map.get_str("age"), Some(int(29)));
        assert_eq!(map.get_str("name"), None);
    }
}
