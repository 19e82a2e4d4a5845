/// A handle to a node slot held by an `Allocator`.
///
/// Handles are only meaningful for the allocator that produced them and are
/// invalidated once the slot is deallocated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(usize);

impl From<usize> for Address {
    fn from(slot: usize) -> Self {
        Self(slot)
    }
}

impl Address {
    pub fn get(&self) -> usize {
        self.0
    }
}
