use crate::types::Address;

#[derive(Debug, PartialEq, Copy, Clone, Eq)]
pub enum NodeType {
    Leaf,
    Internal,
}

pub type Entry<K, V> = (K, V);

/// A node of a [`super::BTree`].
///
/// Keys are kept in ascending order. Values are stored alongside their keys
/// at the same index.
#[derive(Debug)]
pub struct Node<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
    // For the key at position I, children[I] points to the left
    // child of this key and children[I + 1] points to the right child.
    children: Vec<Address>,
    node_type: NodeType,
}

impl<K: Ord, V> Node<K, V> {
    pub fn new(node_type: NodeType) -> Self {
        Self {
            keys: vec![],
            values: vec![],
            children: vec![],
            node_type,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn key(&self, idx: usize) -> &K {
        &self.keys[idx]
    }

    pub fn value(&self, idx: usize) -> &V {
        &self.values[idx]
    }

    pub fn child(&self, idx: usize) -> Address {
        self.children[idx]
    }

    pub fn children(&self) -> &[Address] {
        &self.children
    }

    pub fn insert_child(&mut self, idx: usize, address: Address) {
        self.children.insert(idx, address);
    }

    pub fn push_child(&mut self, address: Address) {
        self.children.push(address);
    }

    pub fn remove_child(&mut self, idx: usize) -> Address {
        self.children.remove(idx)
    }

    pub fn pop_child(&mut self) -> Option<Address> {
        self.children.pop()
    }

    pub fn children_len(&self) -> usize {
        self.children.len()
    }

    pub fn insert_entry(&mut self, idx: usize, (key, value): Entry<K, V>) {
        self.keys.insert(idx, key);
        self.values.insert(idx, value);
    }

    pub fn remove_entry(&mut self, idx: usize) -> Entry<K, V> {
        (self.keys.remove(idx), self.values.remove(idx))
    }

    pub fn push_entry(&mut self, (key, value): Entry<K, V>) {
        self.keys.push(key);
        self.values.push(value);
    }

    pub fn pop_entry(&mut self) -> Option<Entry<K, V>> {
        let key = self.keys.pop()?;
        let value = self
            .values
            .pop()
            .expect("a node has as many values as keys");
        Some((key, value))
    }

    /// Replaces the entry at `idx`, returning the previous one.
    pub fn swap_entry(&mut self, idx: usize, (key, value): Entry<K, V>) -> Entry<K, V> {
        let old_key = std::mem::replace(&mut self.keys[idx], key);
        let old_value = std::mem::replace(&mut self.values[idx], value);
        (old_key, old_value)
    }

    /// Returns the number of entries in the node.
    pub fn entries_len(&self) -> usize {
        self.keys.len()
    }

    /// Searches for the key in the node's entries.
    ///
    /// If the key is found then `Result::Ok` is returned, containing the index
    /// of the matching key. If the value is not found then `Result::Err` is
    /// returned, containing the index where a matching key could be inserted
    /// while maintaining sorted order.
    pub fn search(&self, key: &K) -> Result<usize, usize> {
        self.keys.binary_search(key)
    }

    /// Moves the entries above the median, and the children to their right,
    /// into `sibling`, and returns the median entry.
    ///
    /// PRECONDITION:
    ///   * the node holds `2 * order + 1` entries.
    ///   * `sibling` is empty and of the same node type.
    ///
    /// POSTCONDITION:
    ///   * both nodes hold `order` entries.
    pub fn split(&mut self, sibling: &mut Node<K, V>, order: usize) -> Entry<K, V> {
        debug_assert_eq!(self.entries_len(), 2 * order + 1);
        debug_assert_eq!(sibling.entries_len(), 0);
        debug_assert_eq!(self.node_type, sibling.node_type);

        sibling.keys = self.keys.split_off(order + 1);
        sibling.values = self.values.split_off(order + 1);
        if self.node_type == NodeType::Internal {
            sibling.children = self.children.split_off(order + 1);
        }

        self.pop_entry()
            .expect("an overflowing node cannot be empty")
    }

    /// Appends the median entry and then all the entries and children of
    /// `right` into this node.
    ///
    /// PRECONDITION:
    ///   * keys of `self` < median < keys of `right`
    ///   * `self` and `right` are of the same node type.
    pub fn merge(&mut self, mut right: Node<K, V>, median: Entry<K, V>) {
        assert_eq!(self.node_type, right.node_type);
        debug_assert!(self.keys.last().map_or(true, |last| last < &median.0));
        debug_assert!(right.keys.first().map_or(true, |first| &median.0 < first));

        self.push_entry(median);
        self.keys.append(&mut right.keys);
        self.values.append(&mut right.values);
        self.children.append(&mut right.children);
    }
}
