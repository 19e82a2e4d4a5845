use super::{BinarySearchTree, Element};
use crate::types::Address;

/// An in-order iterator over the elements of a [`BinarySearchTree`].
///
/// The iterator keeps the path of nodes whose left subtree has been entered
/// but whose own element has not been yielded yet.
pub struct Iter<'a, K, V> {
    tree: &'a BinarySearchTree<K, V>,
    stack: Vec<Address>,
}

impl<'a, K: Ord, V> Iter<'a, K, V> {
    pub(crate) fn new(tree: &'a BinarySearchTree<K, V>) -> Self {
        let mut iter = Self {
            tree,
            stack: Vec::new(),
        };
        iter.push_left_spine(tree.root);
        iter
    }

    fn push_left_spine(&mut self, mut current: Option<Address>) {
        while let Some(address) = current {
            self.stack.push(address);
            current = self.tree.node(address).left;
        }
    }
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Element<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let address = self.stack.pop()?;
        let node = tree.node(address);
        self.push_left_spine(node.right);
        Some(&node.element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.stack.len(), Some(self.tree.len()))
    }
}
