//! Storage for multi-valued features
//!
//! A [`Collection`] only stores values and enforces its uniqueness discipline.
//! Propagation (containment, opposites, notification) lives in the runtime,
//! which is the only code that mutates collections.

use crate::value::Value;

/// Collection discipline selected from a feature's `ordered`/`unique` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Duplicates allowed; supports positional replacement
    OrderedDuplicates,
    /// No duplicates; insertion order kept
    OrderedUnique,
    /// No duplicates; insertion order kept as the representation
    UnorderedUnique,
}

impl CollectionKind {
    /// Select a kind from feature flags
    pub fn from_flags(ordered: bool, unique: bool) -> Self {
        match (ordered, unique) {
            (true, true) => CollectionKind::OrderedUnique,
            (false, true) => CollectionKind::UnorderedUnique,
            (_, false) => CollectionKind::OrderedDuplicates,
        }
    }

    /// Whether duplicates are silently rejected
    pub fn is_unique(self) -> bool {
        !matches!(self, CollectionKind::OrderedDuplicates)
    }

    /// Whether `replace_at` is supported
    pub fn supports_replace(self) -> bool {
        matches!(self, CollectionKind::OrderedDuplicates)
    }
}

/// Values of one multi-valued feature on one instance
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    kind: CollectionKind,
    items: Vec<Value>,
}

impl Collection {
    /// Create an empty collection
    pub fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    /// Create a collection from existing items, dropping duplicates for unique kinds
    pub fn from_items(kind: CollectionKind, items: impl IntoIterator<Item = Value>) -> Self {
        let mut collection = Self::new(kind);
        for item in items {
            collection.push(item);
        }
        collection
    }

    /// Collection discipline
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements in insertion order
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Iterate over elements
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Element at a position
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Membership test
    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains(value)
    }

    /// Position of the first occurrence
    pub fn position(&self, value: &Value) -> Option<usize> {
        self.items.iter().position(|v| v == value)
    }

    /// Number of occurrences
    pub fn occurrences(&self, value: &Value) -> usize {
        self.items.iter().filter(|v| *v == value).count()
    }

    /// Append; returns false when a unique collection already holds the value
    pub(crate) fn push(&mut self, value: Value) -> bool {
        if self.kind.is_unique() && self.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Remove the first occurrence, returning its position
    pub(crate) fn remove_value(&mut self, value: &Value) -> Option<usize> {
        let index = self.position(value)?;
        self.items.remove(index);
        Some(index)
    }

    /// Replace the element at `index`; the caller checks bounds
    pub(crate) fn replace(&mut self, index: usize, value: Value) -> Value {
        std::mem::replace(&mut self.items[index], value)
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
