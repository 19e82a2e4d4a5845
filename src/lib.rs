#![doc = include_str!("../README.md")]
mod allocator;
pub mod bst;
pub mod btree;
pub mod element;
pub mod heap;
mod types;

pub use bst::BinarySearchTree;
pub use btree::BTree;
pub use element::Element;
pub use heap::{Heap, HeapKind};
