//! A B-tree of even order `d`.
//!
//! Every node except the root holds between `d` and `2d` entries, and all
//! leaves sit at the same depth. Insertion splits overflowing nodes around
//! their middle entry; removal borrows from a neighbor or merges with one
//! when a node drops below `d` entries.
//!
//! Nodes are kept in an arena and refer to their children by address. There
//! are no parent links: mutating operations remember the path they descended
//! and walk it back up to split or rebalance.
//!
//! ```text
//!                 [ 3 | 6 ]
//!                /    |    \
//!     [ 0 | 1 | 2 ] [ 4 | 5 ] [ 7 | 8 ]
//! ```
use crate::allocator::Allocator;
use crate::types::Address;
use std::fmt;

mod iter;
mod node;
#[cfg(test)]
mod proptests;

pub use iter::Iter;
use node::{Node, NodeType};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InitError {
    /// The order must be an even number greater than 0.
    InvalidOrder(usize),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOrder(order) => write!(
                f,
                "invalid b-tree order {order}: the order must be an even number greater than 0"
            ),
        }
    }
}

impl std::error::Error for InitError {}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BTreeError {
    /// The tree holds no entries.
    EmptyState,
    /// An entry with the same key is already stored.
    DuplicateKey,
    /// No entry with the given key is stored.
    KeyNotFound,
}

impl fmt::Display for BTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyState => write!(f, "b-tree is empty"),
            Self::DuplicateKey => write!(f, "an entry with this key already exists"),
            Self::KeyNotFound => write!(f, "key not found"),
        }
    }
}

impl std::error::Error for BTreeError {}

/// A B-tree map with unique keys.
///
/// ```rust
/// use ordered_structures::BTree;
///
/// let mut tree = BTree::new(2).unwrap();
/// for key in [1, 5, 2, 4, 3] {
///     tree.add(key, key.to_string()).unwrap();
/// }
///
/// assert_eq!(tree.keys_in_nodes(), vec![vec![3], vec![1, 2], vec![4, 5]]);
/// assert_eq!(tree.search(&4).unwrap().map(String::as_str), Some("4"));
/// assert_eq!(tree.remove(&3).unwrap(), "3");
/// ```
#[derive(Debug)]
pub struct BTree<K, V> {
    allocator: Allocator<Node<K, V>>,
    root: Option<Address>,
    order: usize,
    length: usize,
}

impl<K: Ord, V> BTree<K, V> {
    /// Creates an empty tree whose non-root nodes hold between `order` and
    /// `2 * order` entries.
    pub fn new(order: usize) -> Result<Self, InitError> {
        if order == 0 || order % 2 != 0 {
            return Err(InitError::InvalidOrder(order));
        }

        Ok(Self {
            allocator: Allocator::new(),
            root: None,
            order,
            length: 0,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns the number of entries in the tree.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the value stored under `key`, or `None` if the key is absent.
    ///
    /// Fails with [`BTreeError::EmptyState`] if the tree holds no entries.
    ///
    /// Complexity: O(log n)
    pub fn search(&self, key: &K) -> Result<Option<&V>, BTreeError> {
        let root = self.root.ok_or(BTreeError::EmptyState)?;
        Ok(self.find(root, key).map(|(address, idx)| self.node(address).value(idx)))
    }

    /// Returns true if the key exists.
    pub fn contains_key(&self, key: &K) -> bool {
        self.root
            .and_then(|root| self.find(root, key))
            .is_some()
    }

    /// Adds a new entry, failing with [`BTreeError::DuplicateKey`] if the key
    /// is already present.
    ///
    /// Complexity: O(log n)
    pub fn add(&mut self, key: K, value: V) -> Result<(), BTreeError> {
        let root = match self.root {
            Some(root) => root,
            None => {
                let mut node = Node::new(NodeType::Leaf);
                node.push_entry((key, value));
                self.root = Some(self.allocator.allocate(node));
                self.length = 1;
                return Ok(());
            }
        };

        // Descend to the leaf that should hold the key, remembering the path.
        let mut path = vec![];
        let mut address = root;
        let idx = loop {
            let node = self.node(address);
            match node.search(&key) {
                Ok(_) => return Err(BTreeError::DuplicateKey),
                Err(idx) => match node.node_type() {
                    NodeType::Leaf => break idx,
                    NodeType::Internal => {
                        path.push((address, idx));
                        address = node.child(idx);
                    }
                },
            }
        };

        self.node_mut(address).insert_entry(idx, (key, value));
        self.length += 1;
        self.split_overflowing(address, path);

        debug_assert_eq!(Ok(()), self.check_invariant());
        Ok(())
    }

    /// Removes the entry with the given key and returns its value.
    ///
    /// Complexity: O(log n)
    pub fn remove(&mut self, key: &K) -> Result<V, BTreeError> {
        let root = self.root.ok_or(BTreeError::EmptyState)?;

        let mut path = vec![];
        let mut address = root;
        let (address, (_, value)) = loop {
            let node = self.node(address);
            match (node.search(key), node.node_type()) {
                (Ok(idx), NodeType::Leaf) => {
                    break (address, self.node_mut(address).remove_entry(idx));
                }
                (Ok(idx), NodeType::Internal) => {
                    // Substitute the entry with the smallest entry of its right
                    // subtree, which always sits at the front of a leaf.
                    path.push((address, idx + 1));
                    let mut leaf = node.child(idx + 1);
                    while self.node(leaf).node_type() == NodeType::Internal {
                        path.push((leaf, 0));
                        leaf = self.node(leaf).child(0);
                    }

                    let successor = self.node_mut(leaf).remove_entry(0);
                    let removed = self.node_mut(address).swap_entry(idx, successor);
                    break (leaf, removed);
                }
                (Err(_), NodeType::Leaf) => return Err(BTreeError::KeyNotFound),
                (Err(idx), NodeType::Internal) => {
                    path.push((address, idx));
                    address = node.child(idx);
                }
            }
        };

        self.length -= 1;
        self.rebalance(address, path);

        debug_assert_eq!(Ok(()), self.check_invariant());
        Ok(value)
    }

    /// Returns the number of levels in the tree, counting the root as 1.
    pub fn depth(&self) -> usize {
        // All leaves sit at the same depth, so following the first child suffices.
        let mut depth = 0;
        let mut current = self.root;
        while let Some(address) = current {
            depth += 1;
            let node = self.node(address);
            current = match node.node_type() {
                NodeType::Leaf => None,
                NodeType::Internal => Some(node.child(0)),
            };
        }
        depth
    }

    /// Returns the keys of every node, level by level from the root and left
    /// to right within a level.
    pub fn keys_in_nodes(&self) -> Vec<Vec<K>>
    where
        K: Clone,
    {
        let mut groups = vec![];
        let mut queue: std::collections::VecDeque<Address> = self.root.into_iter().collect();
        while let Some(address) = queue.pop_front() {
            let node = self.node(address);
            groups.push(node.keys().to_vec());
            queue.extend(node.children().iter().copied());
        }
        groups
    }

    /// Returns the entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let mut node = self.node(self.root?);
        while node.node_type() == NodeType::Internal {
            node = self.node(node.child(0));
        }
        Some((node.key(0), node.value(0)))
    }

    /// Returns the entry with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut node = self.node(self.root?);
        while node.node_type() == NodeType::Internal {
            node = self.node(node.child(node.children_len() - 1));
        }
        let last = node.entries_len() - 1;
        Some((node.key(last), node.value(last)))
    }

    /// Returns an iterator over the entries, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Returns the node and index holding `key` in the subtree at `address`.
    fn find(&self, mut address: Address, key: &K) -> Option<(Address, usize)> {
        loop {
            let node = self.node(address);
            match node.search(key) {
                Ok(idx) => return Some((address, idx)),
                Err(idx) => match node.node_type() {
                    NodeType::Leaf => return None,
                    NodeType::Internal => address = node.child(idx),
                },
            }
        }
    }

    /// Splits the node at `address` while it holds more than `2 * order`
    /// entries, promoting the median into the parent found on `path`.
    fn split_overflowing(&mut self, mut address: Address, mut path: Vec<(Address, usize)>) {
        let order = self.order;
        while self.node(address).entries_len() > 2 * order {
            let mut sibling = Node::new(self.node(address).node_type());
            let median = self.node_mut(address).split(&mut sibling, order);
            let sibling = self.allocator.allocate(sibling);

            tracing::debug!(
                node = address.get(),
                sibling = sibling.get(),
                "split b-tree node"
            );

            match path.pop() {
                Some((parent, idx)) => {
                    let parent_node = self.node_mut(parent);
                    parent_node.insert_entry(idx, median);
                    parent_node.insert_child(idx + 1, sibling);
                    address = parent;
                }
                None => {
                    // The root was split. Grow the tree by one level.
                    let mut new_root = Node::new(NodeType::Internal);
                    new_root.push_entry(median);
                    new_root.push_child(address);
                    new_root.push_child(sibling);
                    let new_root = self.allocator.allocate(new_root);
                    self.root = Some(new_root);

                    tracing::debug!(root = new_root.get(), depth = self.depth(), "new b-tree root");
                    return;
                }
            }
        }
    }

    /// Restores the minimum occupancy of the node at `address` and of its
    /// ancestors after an entry was removed from it.
    fn rebalance(&mut self, mut address: Address, mut path: Vec<(Address, usize)>) {
        let order = self.order;
        loop {
            let (parent, idx) = match path.pop() {
                Some(step) => step,
                None => {
                    self.shrink_root(address);
                    return;
                }
            };

            if self.node(address).entries_len() >= order {
                return;
            }

            let parent_node = self.node(parent);
            let left = idx.checked_sub(1).map(|i| parent_node.child(i));
            let right = (idx + 1 < parent_node.children_len()).then(|| parent_node.child(idx + 1));
            let len_of = |sibling: Option<Address>| {
                sibling.map_or(0, |sibling| self.node(sibling).entries_len())
            };
            let (left_len, right_len) = (len_of(left), len_of(right));

            match (left, right) {
                (_, Some(right)) if right_len > order && right_len >= left_len => {
                    self.borrow_from_right(parent, idx, address, right);
                    return;
                }
                (Some(left), _) if left_len > order && left_len > right_len => {
                    self.borrow_from_left(parent, idx, left, address);
                    return;
                }
                (Some(left), _) => self.merge(parent, idx - 1, left, address),
                (None, Some(right)) => self.merge(parent, idx, address, right),
                (None, None) => unreachable!("a non-root node always has a sibling"),
            }

            address = parent;
        }
    }

    /// Moves the first entry of `right` up into the parent and the parent's
    /// separator down to the end of `node`.
    fn borrow_from_right(&mut self, parent: Address, idx: usize, node: Address, right: Address) {
        let right_node = self.node_mut(right);
        let entry = right_node.remove_entry(0);
        let child = match right_node.node_type() {
            NodeType::Internal => Some(right_node.remove_child(0)),
            NodeType::Leaf => None,
        };

        let separator = self.node_mut(parent).swap_entry(idx, entry);

        let node_ref = self.node_mut(node);
        node_ref.push_entry(separator);
        if let Some(child) = child {
            node_ref.push_child(child);
        }

        tracing::debug!(node = node.get(), from = right.get(), "borrowed from right b-tree node");
    }

    /// Moves the last entry of `left` up into the parent and the parent's
    /// separator down to the front of `node`.
    fn borrow_from_left(&mut self, parent: Address, idx: usize, left: Address, node: Address) {
        let left_node = self.node_mut(left);
        let entry = left_node
            .pop_entry()
            .expect("a node with surplus entries cannot be empty");
        let child = match left_node.node_type() {
            NodeType::Internal => left_node.pop_child(),
            NodeType::Leaf => None,
        };

        let separator = self.node_mut(parent).swap_entry(idx - 1, entry);

        let node_ref = self.node_mut(node);
        node_ref.insert_entry(0, separator);
        if let Some(child) = child {
            node_ref.insert_child(0, child);
        }

        tracing::debug!(node = node.get(), from = left.get(), "borrowed from left b-tree node");
    }

    /// Merges `right` and the parent's separator at `separator_idx` into
    /// `left`, and frees `right`.
    fn merge(&mut self, parent: Address, separator_idx: usize, left: Address, right: Address) {
        let parent_node = self.node_mut(parent);
        let separator = parent_node.remove_entry(separator_idx);
        let removed = parent_node.remove_child(separator_idx + 1);
        debug_assert_eq!(removed, right);

        let right_node = self.allocator.deallocate(right);
        self.node_mut(left).merge(right_node, separator);

        tracing::debug!(node = left.get(), merged = right.get(), "merged b-tree nodes");
    }

    /// Drops an empty root: an empty leaf root leaves the tree empty and an
    /// empty internal root is replaced by its only child.
    fn shrink_root(&mut self, root: Address) {
        let node = self.node(root);
        if node.entries_len() > 0 {
            return;
        }

        self.root = match node.node_type() {
            NodeType::Leaf => None,
            NodeType::Internal => Some(node.child(0)),
        };
        self.allocator.deallocate(root);

        tracing::debug!(old_root = root.get(), depth = self.depth(), "collapsed b-tree root");
    }

    fn node(&self, address: Address) -> &Node<K, V> {
        self.allocator.get(address)
    }

    fn node_mut(&mut self, address: Address) -> &mut Node<K, V> {
        self.allocator.get_mut(address)
    }

    /// Checks node occupancy, key order, leaf depth and the entry count.
    fn check_invariant(&self) -> Result<(), String> {
        let root = match self.root {
            Some(root) => root,
            None if self.length == 0 && self.allocator.num_allocated_slots() == 0 => {
                return Ok(())
            }
            None => return Err("an empty tree still holds entries or nodes".to_string()),
        };

        let max = 2 * self.order;
        let mut entries = 0;
        let mut nodes = 0;
        let mut leaf_depth = None;
        // (address, depth, exclusive lower bound, exclusive upper bound)
        let mut stack: Vec<(Address, usize, Option<&K>, Option<&K>)> = vec![(root, 1, None, None)];

        while let Some((address, depth, lower, upper)) = stack.pop() {
            let node = self.node(address);
            let len = node.entries_len();
            nodes += 1;
            entries += len;

            let min = if address == root { 1 } else { self.order };
            if len < min || len > max {
                return Err(format!(
                    "node {} holds {len} entries, expected between {min} and {max}",
                    address.get()
                ));
            }

            let keys = node.keys();
            if keys.windows(2).any(|pair| pair[0] >= pair[1])
                || lower.is_some_and(|lower| &keys[0] <= lower)
                || upper.is_some_and(|upper| &keys[len - 1] >= upper)
            {
                return Err(format!("keys of node {} are out of order", address.get()));
            }

            match node.node_type() {
                NodeType::Leaf => {
                    if node.children_len() != 0 {
                        return Err(format!("leaf {} has children", address.get()));
                    }
                    if *leaf_depth.get_or_insert(depth) != depth {
                        return Err(format!("leaf {} is at depth {depth}", address.get()));
                    }
                }
                NodeType::Internal => {
                    if node.children_len() != len + 1 {
                        return Err(format!(
                            "internal node {} has {} children for {len} entries",
                            address.get(),
                            node.children_len()
                        ));
                    }
                    for (i, child) in node.children().iter().enumerate() {
                        let lower = if i == 0 { lower } else { Some(&keys[i - 1]) };
                        let upper = if i == len { upper } else { Some(&keys[i]) };
                        stack.push((*child, depth + 1, lower, upper));
                    }
                }
            }
        }

        if entries != self.length || nodes != self.allocator.num_allocated_slots() {
            return Err(format!(
                "{entries} entries in {nodes} nodes, length {}, {} allocated nodes",
                self.length,
                self.allocator.num_allocated_slots()
            ));
        }

        Ok(())
    }
}
