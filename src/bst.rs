//! An unbalanced binary search tree that exposes rotation primitives.
//!
//! The tree never rebalances itself. Callers that need balance (AVL, red-black
//! and similar schemes) drive it through [`BinarySearchTree::rotate_left`],
//! [`BinarySearchTree::rotate_right`] and their double ("big") variants, each of
//! which preserves the in-order key sequence.
//!
//! Nodes live in an arena and refer to their parent and children by address.
use crate::allocator::Allocator;
use crate::element::Element;
use crate::types::Address;
use std::cmp::Ordering;
use std::fmt;

mod iter;
#[cfg(test)]
mod proptests;

pub use iter::Iter;

/// One of the two child positions below a node.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BstError {
    /// An element with the same key is already stored.
    DuplicateKey,
    /// No element with the given key is stored.
    KeyNotFound,
    /// The rotation pivot has no child on `side`.
    MissingChild { side: Side },
    /// The pivot's child has no child on `side`, which a double rotation needs.
    InvalidRotation { side: Side },
}

impl fmt::Display for BstError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey => write!(f, "an element with this key already exists"),
            Self::KeyNotFound => write!(f, "element not found"),
            Self::MissingChild { side } => {
                write!(f, "node has no {side} child to rotate around")
            }
            Self::InvalidRotation { side } => {
                write!(f, "child node has no {side} child for a double rotation")
            }
        }
    }
}

impl std::error::Error for BstError {}

#[derive(Debug)]
struct Node<K, V> {
    element: Element<K, V>,
    parent: Option<Address>,
    left: Option<Address>,
    right: Option<Address>,
}

impl<K, V> Node<K, V> {
    fn child(&self, side: Side) -> Option<Address> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn set_child(&mut self, side: Side, child: Option<Address>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

/// A binary search tree of [`Element`]s with unique keys.
///
/// ```rust
/// use ordered_structures::{BinarySearchTree, Element};
///
/// let mut tree = BinarySearchTree::new();
/// for key in [12, 3, 20, 7] {
///     tree.insert(Element::new(key, key * 10)).unwrap();
/// }
///
/// tree.rotate_left(&12).unwrap();
/// let keys: Vec<_> = tree.keys().copied().collect();
/// assert_eq!(keys, vec![3, 7, 12, 20]);
/// assert_eq!(tree.find(&7).map(|e| e.value), Some(70));
/// ```
#[derive(Debug)]
pub struct BinarySearchTree<K, V> {
    nodes: Allocator<Node<K, V>>,
    root: Option<Address>,
    length: usize,
}

impl<K: Ord, V> Default for BinarySearchTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> BinarySearchTree<K, V> {
    pub fn new() -> Self {
        Self {
            nodes: Allocator::new(),
            root: None,
            length: 0,
        }
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Removes all elements from the tree.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.length = 0;
    }

    /// Inserts an element, failing with [`BstError::DuplicateKey`] if its key is
    /// already present.
    ///
    /// Complexity: O(height)
    pub fn insert(&mut self, element: Element<K, V>) -> Result<(), BstError> {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;

        while let Some(address) = current {
            let node = self.node(address);
            parent = Some(address);
            side = match element.key.cmp(&node.element.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Err(BstError::DuplicateKey),
            };
            current = node.child(side);
        }

        let address = self.nodes.allocate(Node {
            element,
            parent,
            left: None,
            right: None,
        });

        match parent {
            None => self.root = Some(address),
            Some(parent) => self.node_mut(parent).set_child(side, Some(address)),
        }
        self.length += 1;

        debug_assert_eq!(Ok(()), self.check_invariant());
        Ok(())
    }

    /// Returns the element with the given key, if it exists.
    pub fn find(&self, key: &K) -> Option<&Element<K, V>> {
        self.find_address(key).map(|address| &self.node(address).element)
    }

    /// Returns true if the key exists.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_address(key).is_some()
    }

    /// Removes the element with the given key and returns it.
    ///
    /// A node with two children first trades places with its in-order
    /// predecessor (the maximum of its left subtree) and is then unlinked from
    /// that position, where it has at most one child.
    ///
    /// Complexity: O(height)
    pub fn delete(&mut self, key: &K) -> Result<Element<K, V>, BstError> {
        let address = self.find_address(key).ok_or(BstError::KeyNotFound)?;

        self.unlink(address);
        self.length -= 1;
        let node = self.nodes.deallocate(address);

        debug_assert_eq!(Ok(()), self.check_invariant());
        Ok(node.element)
    }

    /// Returns the element with the smallest key.
    pub fn min(&self) -> Option<&Element<K, V>> {
        self.root
            .map(|root| &self.node(self.extreme_from(root, Side::Left)).element)
    }

    /// Returns the element with the largest key.
    pub fn max(&self) -> Option<&Element<K, V>> {
        self.root
            .map(|root| &self.node(self.extreme_from(root, Side::Right)).element)
    }

    /// Returns the maximum of the left subtree of the node with the given key.
    ///
    /// Only the node's own subtree is searched: `None` is returned when the key
    /// is absent or the node has no left child, even if a smaller key exists
    /// further up the tree.
    pub fn find_predecessor(&self, key: &K) -> Option<&Element<K, V>> {
        let left = self.node(self.find_address(key)?).left?;
        Some(&self.node(self.extreme_from(left, Side::Right)).element)
    }

    /// Returns the minimum of the right subtree of the node with the given key.
    ///
    /// Like [`BinarySearchTree::find_predecessor`], ancestors are not searched.
    pub fn find_successor(&self, key: &K) -> Option<&Element<K, V>> {
        let right = self.node(self.find_address(key)?).right?;
        Some(&self.node(self.extreme_from(right, Side::Left)).element)
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        self.height_from(self.root)
    }

    /// Returns the height of the root's left subtree.
    pub fn left_height(&self) -> usize {
        self.height_from(self.root.and_then(|root| self.node(root).left))
    }

    /// Returns the height of the root's right subtree.
    pub fn right_height(&self) -> usize {
        self.height_from(self.root.and_then(|root| self.node(root).right))
    }

    /// Returns an iterator over the elements, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Returns an iterator over the keys, in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|element| &element.key)
    }

    /// Returns an iterator over the values, sorted by key.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|element| &element.value)
    }

    /// Rotates the subtree rooted at `key` to the left: the right child takes
    /// the node's place and the node becomes its left child.
    ///
    /// Example:
    /// ```ignore
    ///          [N]                    [R]
    ///         /   \                  /   \
    ///       [a]   [R]      =>      [N]   [c]
    ///            /   \            /   \
    ///          [b]   [c]        [a]   [b]
    /// ```
    pub fn rotate_left(&mut self, key: &K) -> Result<(), BstError> {
        let node = self.find_address(key).ok_or(BstError::KeyNotFound)?;
        let right = self.node(node).right.ok_or(BstError::MissingChild {
            side: Side::Right,
        })?;

        self.rotate(node, right, Side::Left);
        debug_assert_eq!(Ok(()), self.check_invariant());
        Ok(())
    }

    /// Rotates the subtree rooted at `key` to the right: the left child takes
    /// the node's place and the node becomes its right child.
    pub fn rotate_right(&mut self, key: &K) -> Result<(), BstError> {
        let node = self.find_address(key).ok_or(BstError::KeyNotFound)?;
        let left = self.node(node).left.ok_or(BstError::MissingChild {
            side: Side::Left,
        })?;

        self.rotate(node, left, Side::Right);
        debug_assert_eq!(Ok(()), self.check_invariant());
        Ok(())
    }

    /// Double rotation to the left: the left child of the node's right child
    /// rises to the node's place.
    ///
    /// Example:
    /// ```ignore
    ///          [N]                       [G]
    ///         /   \                    /     \
    ///       [a]   [R]                [N]     [R]
    ///            /   \      =>      /   \   /   \
    ///          [G]   [d]          [a]  [b] [c]  [d]
    ///         /   \
    ///       [b]   [c]
    /// ```
    pub fn rotate_big_left(&mut self, key: &K) -> Result<(), BstError> {
        let node = self.find_address(key).ok_or(BstError::KeyNotFound)?;
        let right = self.node(node).right.ok_or(BstError::MissingChild {
            side: Side::Right,
        })?;
        let right_left = self.node(right).left.ok_or(BstError::InvalidRotation {
            side: Side::Left,
        })?;

        self.rotate(right, right_left, Side::Right);
        self.rotate(node, right_left, Side::Left);
        debug_assert_eq!(Ok(()), self.check_invariant());
        Ok(())
    }

    /// Double rotation to the right: the right child of the node's left child
    /// rises to the node's place.
    pub fn rotate_big_right(&mut self, key: &K) -> Result<(), BstError> {
        let node = self.find_address(key).ok_or(BstError::KeyNotFound)?;
        let left = self.node(node).left.ok_or(BstError::MissingChild {
            side: Side::Left,
        })?;
        let left_right = self.node(left).right.ok_or(BstError::InvalidRotation {
            side: Side::Right,
        })?;

        self.rotate(left, left_right, Side::Left);
        self.rotate(node, left_right, Side::Right);
        debug_assert_eq!(Ok(()), self.check_invariant());
        Ok(())
    }

    /// Moves `node` down towards `direction` and lifts `child`, which must be
    /// the node's child on the opposite side, into its place.
    fn rotate(&mut self, node: Address, child: Address, direction: Side) {
        let rising = direction.opposite();
        debug_assert_eq!(self.node(node).child(rising), Some(child));

        let parent = self.node(node).parent;
        self.node_mut(child).parent = parent;
        self.replace_child(parent, node, Some(child));

        // The child's inner subtree changes hands.
        let inner = self.node(child).child(direction);
        self.node_mut(node).set_child(rising, inner);
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(node);
        }

        self.node_mut(node).parent = Some(child);
        self.node_mut(child).set_child(direction, Some(node));

        tracing::debug!(
            node = node.get(),
            child = child.get(),
            %direction,
            "rotated binary search tree node"
        );
    }

    /// Detaches the node at `address` from the tree without freeing it.
    fn unlink(&mut self, address: Address) {
        let node = self.node(address);
        let parent = node.parent;

        match (node.left, node.right) {
            (None, None) => self.replace_child(parent, address, None),
            (Some(child), None) | (None, Some(child)) => {
                self.replace_child(parent, address, Some(child));
                self.node_mut(child).parent = parent;
            }
            (Some(left), Some(_)) => {
                let predecessor = self.extreme_from(left, Side::Right);
                self.swap_nodes(address, predecessor);
                // The node now sits where its predecessor was and has no right child.
                self.unlink(address);
            }
        }
    }

    /// Exchanges the positions of two nodes in the tree, elements included.
    ///
    /// This may break the ordering invariant; callers restore it.
    fn swap_nodes(&mut self, a: Address, b: Address) {
        if a == b {
            return;
        }

        let (a_parent, a_left, a_right) = self.links(a);
        let (b_parent, b_left, b_right) = self.links(b);
        let a_side = a_parent.map(|p| self.side_of(p, a));
        let b_side = b_parent.map(|p| self.side_of(p, b));

        // A link to the other node turns into a link back to this node, which
        // covers the case of `a` and `b` being parent and child.
        let swap = |x: Option<Address>| match x {
            Some(x) if x == a => Some(b),
            Some(x) if x == b => Some(a),
            other => other,
        };

        {
            let node = self.node_mut(a);
            node.parent = swap(b_parent);
            node.left = swap(b_left);
            node.right = swap(b_right);
        }
        {
            let node = self.node_mut(b);
            node.parent = swap(a_parent);
            node.left = swap(a_left);
            node.right = swap(a_right);
        }

        // Fix the back-references of the surrounding nodes.
        if let (Some(parent), Some(side)) = (a_parent, a_side) {
            if parent != b {
                self.node_mut(parent).set_child(side, Some(b));
            }
        }
        if let (Some(parent), Some(side)) = (b_parent, b_side) {
            if parent != a {
                self.node_mut(parent).set_child(side, Some(a));
            }
        }
        for child in [a_left, a_right].into_iter().flatten() {
            if child != b {
                self.node_mut(child).parent = Some(b);
            }
        }
        for child in [b_left, b_right].into_iter().flatten() {
            if child != a {
                self.node_mut(child).parent = Some(a);
            }
        }

        if self.root == Some(a) {
            self.root = Some(b);
        } else if self.root == Some(b) {
            self.root = Some(a);
        }
    }

    /// Points whatever referred to `old` (its parent, or the root) at `new`.
    fn replace_child(&mut self, parent: Option<Address>, old: Address, new: Option<Address>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let side = self.side_of(parent, old);
                self.node_mut(parent).set_child(side, new);
            }
        }
    }

    /// Returns on which side of `parent` the node `child` hangs.
    fn side_of(&self, parent: Address, child: Address) -> Side {
        if self.node(parent).left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn links(&self, address: Address) -> (Option<Address>, Option<Address>, Option<Address>) {
        let node = self.node(address);
        (node.parent, node.left, node.right)
    }

    /// Follows `side` children from `address` as far as possible.
    fn extreme_from(&self, mut address: Address, side: Side) -> Address {
        while let Some(child) = self.node(address).child(side) {
            address = child;
        }
        address
    }

    fn find_address(&self, key: &K) -> Option<Address> {
        let mut current = self.root;
        while let Some(address) = current {
            let node = self.node(address);
            current = match key.cmp(&node.element.key) {
                Ordering::Equal => return Some(address),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    fn height_from(&self, root: Option<Address>) -> usize {
        // Iterative so that list-shaped trees don't exhaust the stack.
        let mut height = 0;
        let mut stack: Vec<(Address, usize)> = root.into_iter().map(|r| (r, 1)).collect();
        while let Some((address, depth)) = stack.pop() {
            height = height.max(depth);
            let node = self.node(address);
            for child in [node.left, node.right].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        height
    }

    fn node(&self, address: Address) -> &Node<K, V> {
        self.nodes.get(address)
    }

    fn node_mut(&mut self, address: Address) -> &mut Node<K, V> {
        self.nodes.get_mut(address)
    }

    /// Checks the ordering of keys, the parent back-references and the length.
    fn check_invariant(&self) -> Result<(), String> {
        if let Some(root) = self.root {
            if self.node(root).parent.is_some() {
                return Err("root node has a parent".to_string());
            }
        }

        let mut reachable = 0;
        let mut stack: Vec<Address> = self.root.into_iter().collect();
        while let Some(address) = stack.pop() {
            reachable += 1;
            let node = self.node(address);
            for child in [node.left, node.right].into_iter().flatten() {
                if self.node(child).parent != Some(address) {
                    return Err(format!(
                        "node {} does not point back to its parent {}",
                        child.get(),
                        address.get()
                    ));
                }
                stack.push(child);
            }
        }

        if reachable != self.length || reachable != self.nodes.num_allocated_slots() {
            return Err(format!(
                "{reachable} reachable nodes, length {}, {} allocated nodes",
                self.length,
                self.nodes.num_allocated_slots()
            ));
        }

        let keys: Vec<&K> = self.keys().collect();
        if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err("in-order keys are not strictly ascending".to_string());
        }

        Ok(())
    }
}
