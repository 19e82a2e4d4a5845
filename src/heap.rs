//! A fixed-capacity binary heap whose polarity is chosen at construction.
use crate::element::Element;
use std::fmt;


/// Decides which end of the key order sits at the root of a [`Heap`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum HeapKind {
    /// Every parent key is less than or equal to its children's keys.
    Min,
    /// Every parent key is greater than or equal to its children's keys.
    Max,
}

impl HeapKind {
    /// Returns true if `a` must sit strictly closer to the root than `b`.
    fn prefers<K: Ord>(self, a: &K, b: &K) -> bool {
        match self {
            Self::Min => a < b,
            Self::Max => a > b,
        }
    }
}

impl fmt::Display for HeapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min => write!(f, "min"),
            Self::Max => write!(f, "max"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InitError {
    /// A heap must be able to hold at least one element.
    ZeroCapacity,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "heap capacity must be greater than 0"),
        }
    }
}

impl std::error::Error for InitError {}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HeapError {
    /// The heap holds no elements.
    EmptyState,
    /// The heap already holds `capacity` elements.
    CapacityExceeded { capacity: usize },
    /// `index` does not address one of the `len` stored elements.
    IndexOutOfRange { index: usize, len: usize },
    /// The key edit would move the element away from the root: a min heap only
    /// supports decreasing a key and a max heap only supports increasing it.
    InvalidDirection { kind: HeapKind },
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyState => write!(f, "heap is empty"),
            Self::CapacityExceeded { capacity } => {
                write!(f, "heap is full: capacity is {capacity} elements")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} is out of range for a heap of {len} elements")
            }
            Self::InvalidDirection { kind: HeapKind::Min } => {
                write!(f, "min heap does not support increasing a key")
            }
            Self::InvalidDirection { kind: HeapKind::Max } => {
                write!(f, "max heap does not support decreasing a key")
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// An array-backed binary heap of [`Element`]s with a fixed capacity.
///
/// The parent of the element at index `i` is at `(i - 1) / 2` and its children
/// are at `2i + 1` and `2i + 2`. The root holds the smallest key of a
/// [`HeapKind::Min`] heap and the largest key of a [`HeapKind::Max`] heap.
///
/// ```rust
/// use ordered_structures::{Element, Heap, HeapKind};
///
/// let mut heap = Heap::new(HeapKind::Min, 8).unwrap();
/// heap.insert(Element::new(3, "three")).unwrap();
/// heap.insert(Element::new(1, "one")).unwrap();
///
/// assert_eq!(heap.extract().unwrap().value, "one");
/// ```
#[derive(Debug, Clone)]
pub struct Heap<K, V> {
    kind: HeapKind,
    capacity: usize,
    elements: Vec<Element<K, V>>,
}

// Note: Heap Invariant
// ~~~~~~~~~~~~~~~~~~~~
//
// HeapInvariant(heap, i, j) :=
//   ∀ k: i ≤ k ≤ j: LET p = (k - 1)/2 IN (p ≥ i) => ¬prefers(heap[k], heap[p])

impl<K: Ord, V> Heap<K, V> {
    /// Creates an empty heap that holds up to `capacity` elements.
    ///
    /// Complexity: O(1)
    pub fn new(kind: HeapKind, capacity: usize) -> Result<Self, InitError> {
        if capacity == 0 {
            return Err(InitError::ZeroCapacity);
        }

        Ok(Self {
            kind,
            capacity,
            elements: Vec::with_capacity(capacity),
        })
    }

    pub fn kind(&self) -> HeapKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.capacity - self.elements.len()
    }

    /// Returns the root element.
    pub fn first(&self) -> Result<&Element<K, V>, HeapError> {
        self.elements.first().ok_or(HeapError::EmptyState)
    }

    /// Returns the stored elements in storage order.
    pub fn elements(&self) -> &[Element<K, V>] {
        &self.elements
    }

    /// Returns an iterator over the stored values in storage order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.elements.iter().map(|element| &element.value)
    }

    /// Inserts an element into the heap.
    ///
    /// Complexity: O(log n)
    pub fn insert(&mut self, element: Element<K, V>) -> Result<(), HeapError> {
        if self.elements.len() == self.capacity {
            return Err(HeapError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        self.elements.push(element);
        self.bubble_up(self.elements.len() - 1);
        debug_assert_eq!(Ok(()), self.check_invariant());
        Ok(())
    }

    /// Removes the root element and returns it.
    ///
    /// Complexity: O(log n)
    pub fn extract(&mut self) -> Result<Element<K, V>, HeapError> {
        if self.elements.is_empty() {
            return Err(HeapError::EmptyState);
        }

        // The last element takes the place of the root and sinks from there.
        let root = self.elements.swap_remove(0);
        if !self.elements.is_empty() {
            self.bubble_down(0);
        }
        debug_assert_eq!(Ok(()), self.check_invariant());
        Ok(root)
    }

    /// Replaces the key of the element at `index` and moves the element up
    /// towards the root as far as the new key allows.
    ///
    /// A min heap only accepts a key that is less than or equal to the current
    /// one, a max heap only one that is greater than or equal to it. The element
    /// is never moved down.
    ///
    /// Complexity: O(log n)
    pub fn edit_key(&mut self, index: usize, new_key: K) -> Result<(), HeapError> {
        if self.elements.is_empty() {
            return Err(HeapError::EmptyState);
        }

        let len = self.elements.len();
        if index >= len {
            return Err(HeapError::IndexOutOfRange { index, len });
        }

        if self.kind.prefers(&self.elements[index].key, &new_key) {
            return Err(HeapError::InvalidDirection { kind: self.kind });
        }

        self.elements[index].key = new_key;
        let new_index = self.bubble_up(index);
        tracing::trace!(kind = %self.kind, index, new_index, "edited heap key");
        debug_assert_eq!(Ok(()), self.check_invariant());
        Ok(())
    }

    /// Checks the HeapInvariant(self, 0, self.len() - 1)
    fn check_invariant(&self) -> Result<(), String> {
        for i in 1..self.elements.len() {
            let p = (i - 1) / 2;
            if self
                .kind
                .prefers(&self.elements[i].key, &self.elements[p].key)
            {
                return Err(format!(
                    "{} heap invariant violated in indices {i} and {p}",
                    self.kind
                ));
            }
        }
        Ok(())
    }

    /// Moves the element at `i` up until its parent is not worse than it.
    /// Returns the final position of the element.
    fn bubble_up(&mut self, mut i: usize) -> usize {
        // LOOP INVARIANT: HeapInvariant(self, 0, self.len() - 1) holds for every
        //                 pair except (i, parent(i)).
        while i > 0 {
            let p = (i - 1) / 2;
            if !self
                .kind
                .prefers(&self.elements[i].key, &self.elements[p].key)
            {
                break;
            }
            self.elements.swap(i, p);
            i = p;
        }
        i
    }

    /// Moves the element at `i` down, always towards the child that should sit
    /// closer to the root. Ties between the two children go to the left one.
    fn bubble_down(&mut self, mut i: usize) {
        let n = self.elements.len();
        loop {
            let l = i * 2 + 1;
            let r = l + 1;

            if n <= l {
                return;
            }

            let best = if r < n
                && self
                    .kind
                    .prefers(&self.elements[r].key, &self.elements[l].key)
            {
                r
            } else {
                l
            };

            if !self
                .kind
                .prefers(&self.elements[best].key, &self.elements[i].key)
            {
                return;
            }

            self.elements.swap(i, best);
            i = best;
        }
    }
}
