//! The key/value pair stored by the heap and the binary search tree.
use std::cmp::Ordering;

/// A value paired with an orderable key.
///
/// Equality and ordering look at the key only, so two elements with the same
/// key compare equal even if their values differ.
#[derive(Debug, Clone, Copy, Hash)]
pub struct Element<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Element<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Splits the element into its key and value.
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> From<(K, V)> for Element<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

impl<K: PartialEq, V> PartialEq for Element<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Eq, V> Eq for Element<K, V> {}

impl<K: PartialOrd, V> PartialOrd for Element<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.key.partial_cmp(&other.key)
    }
}

impl<K: Ord, V> Ord for Element<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}
