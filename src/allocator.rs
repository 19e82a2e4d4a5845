//! A slot allocator for tree nodes.
//!
//! Trees keep their nodes in an `Allocator` and link them through [`Address`]
//! handles, so parent and sibling back-references never own what they point to.
//!
//! Freed slots are chained into a free list and handed out again, most recently
//! freed first, before the backing vector grows.
//!
//! ```text
//!  slots:  [ N0 | free | N2 | free | N4 ]
//!                  ^            |
//!                  +------------+   free_list_head = slot 3
//! ```
use crate::types::Address;

#[cfg(test)]
mod tests;

#[derive(Debug)]
enum Slot<T> {
    Occupied(T),
    Free { next: Option<Address> },
}

#[derive(Debug)]
pub struct Allocator<T> {
    slots: Vec<Slot<T>>,
    // The most recently freed slot, if any.
    free_list_head: Option<Address>,
    num_allocated_slots: usize,
}

impl<T> Default for Allocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Allocator<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list_head: None,
            num_allocated_slots: 0,
        }
    }

    /// Stores `value` in a free slot and returns its address.
    pub fn allocate(&mut self, value: T) -> Address {
        let address = match self.free_list_head {
            Some(address) => {
                match self.slots[address.get()] {
                    Slot::Free { next } => self.free_list_head = next,
                    Slot::Occupied(_) => unreachable!("free list points to an occupied slot"),
                }
                self.slots[address.get()] = Slot::Occupied(value);
                address
            }
            None => {
                self.slots.push(Slot::Occupied(value));
                Address::from(self.slots.len() - 1)
            }
        };
        self.num_allocated_slots += 1;
        address
    }

    /// Frees the slot at `address`, returning what it held.
    ///
    /// PRECONDITION: `address` is allocated.
    pub fn deallocate(&mut self, address: Address) -> T {
        assert!(
            matches!(self.slots[address.get()], Slot::Occupied(_)),
            "slot {} is not allocated",
            address.get()
        );

        let freed = Slot::Free {
            next: self.free_list_head,
        };
        self.free_list_head = Some(address);
        self.num_allocated_slots -= 1;

        match std::mem::replace(&mut self.slots[address.get()], freed) {
            Slot::Occupied(value) => value,
            Slot::Free { .. } => unreachable!(),
        }
    }

    pub fn get(&self, address: Address) -> &T {
        match &self.slots[address.get()] {
            Slot::Occupied(value) => value,
            Slot::Free { .. } => panic!("slot {} is not allocated", address.get()),
        }
    }

    pub fn get_mut(&mut self, address: Address) -> &mut T {
        match &mut self.slots[address.get()] {
            Slot::Occupied(value) => value,
            Slot::Free { .. } => panic!("slot {} is not allocated", address.get()),
        }
    }

    /// Returns the number of live slots.
    pub fn num_allocated_slots(&self) -> usize {
        self.num_allocated_slots
    }

    /// Drops every slot, allocated or not.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list_head = None;
        self.num_allocated_slots = 0;
    }
}
