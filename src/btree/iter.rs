use super::{
    node::{Node, NodeType},
    BTree,
};
use crate::types::Address;

/// An indicator of the current position in the tree.
enum Cursor<'a, K, V> {
    Address(Address),
    Node { node: &'a Node<K, V>, next: Index },
}

/// An index into a node's child or entry.
enum Index {
    Child(usize),
    Entry(usize),
}

/// An iterator over the entries of a [`BTree`], sorted by key.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    // A reference to the tree being iterated on.
    tree: &'a BTree<K, V>,

    // A stack of cursors indicating the current position in the tree.
    cursors: Vec<Cursor<'a, K, V>>,

    // The number of entries not yielded yet.
    remaining: usize,
}

impl<'a, K: Ord, V> Iter<'a, K, V> {
    pub(crate) fn new(tree: &'a BTree<K, V>) -> Self {
        Self {
            tree,
            // Initialize the cursors with the address of the root of the tree.
            cursors: tree.root.map(Cursor::Address).into_iter().collect(),
            remaining: tree.len(),
        }
    }
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        match self.cursors.pop() {
            Some(Cursor::Address(address)) => {
                let node = tree.allocator.get(address);
                self.cursors.push(Cursor::Node {
                    next: match node.node_type() {
                        // Iterate on internal nodes starting from the first child.
                        NodeType::Internal => Index::Child(0),
                        // Iterate on leaf nodes starting from the first entry.
                        NodeType::Leaf => Index::Entry(0),
                    },
                    node,
                });
                self.next()
            }

            Some(Cursor::Node {
                node,
                next: Index::Child(child_idx),
            }) => {
                let child_address = node.child(child_idx);

                // After iterating on the child, iterate on the next _entry_ in this node.
                self.cursors.push(Cursor::Node {
                    node,
                    next: Index::Entry(child_idx),
                });

                // Add the child to the top of the cursors to be iterated on first.
                self.cursors.push(Cursor::Address(child_address));

                self.next()
            }

            Some(Cursor::Node {
                node,
                next: Index::Entry(entry_idx),
            }) => {
                if entry_idx >= node.entries_len() {
                    // No more entries to iterate on in this node.
                    return self.next();
                }

                // Add to the cursors the next element to be traversed.
                self.cursors.push(Cursor::Node {
                    next: match node.node_type() {
                        // If this is an internal node, add the next child to the cursors.
                        NodeType::Internal => Index::Child(entry_idx + 1),
                        // If this is a leaf node, add the next entry to the cursors.
                        NodeType::Leaf => Index::Entry(entry_idx + 1),
                    },
                    node,
                });

                self.remaining -= 1;
                Some((node.key(entry_idx), node.value(entry_idx)))
            }

            // The cursors are empty. Iteration is complete.
            None => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Ord, V> ExactSizeIterator for Iter<'_, K, V> {}
