use super::*;

#[test]
fn allocate_grows_sequentially() {
    let mut allocator = Allocator::new();
    assert_eq!(allocator.allocate('a'), Address::from(0));
    assert_eq!(allocator.allocate('b'), Address::from(1));
    assert_eq!(allocator.allocate('c'), Address::from(2));
    assert_eq!(allocator.num_allocated_slots(), 3);
    assert_eq!(*allocator.get(Address::from(1)), 'b');
}

#[test]
fn deallocate_returns_the_value() {
    let mut allocator = Allocator::new();
    let address = allocator.allocate(String::from("node"));
    assert_eq!(allocator.deallocate(address), "node");
    assert_eq!(allocator.num_allocated_slots(), 0);
}

#[test]
fn freed_slots_are_reused_most_recent_first() {
    let mut allocator = Allocator::new();
    let addresses: Vec<_> = (0..5).map(|i| allocator.allocate(i)).collect();

    allocator.deallocate(addresses[1]);
    allocator.deallocate(addresses[3]);

    assert_eq!(allocator.allocate(10), addresses[3]);
    assert_eq!(allocator.allocate(11), addresses[1]);
    // The free list is exhausted, so the arena grows.
    assert_eq!(allocator.allocate(12), Address::from(5));

    assert_eq!(*allocator.get(addresses[3]), 10);
    assert_eq!(*allocator.get(addresses[1]), 11);
    assert_eq!(allocator.num_allocated_slots(), 6);
}

#[test]
fn get_mut_updates_in_place() {
    let mut allocator = Allocator::new();
    let address = allocator.allocate(vec![1, 2]);
    allocator.get_mut(address).push(3);
    assert_eq!(allocator.get(address), &vec![1, 2, 3]);
}

#[test]
fn clear_resets_everything() {
    let mut allocator = Allocator::new();
    let first = allocator.allocate(1);
    allocator.allocate(2);
    allocator.deallocate(first);

    allocator.clear();
    assert_eq!(allocator.num_allocated_slots(), 0);
    assert_eq!(allocator.allocate(3), Address::from(0));
}

#[test]
#[should_panic(expected = "slot 0 is not allocated")]
fn double_free_panics() {
    let mut allocator = Allocator::new();
    let address = allocator.allocate(());
    allocator.deallocate(address);
    allocator.deallocate(address);
}

#[test]
#[should_panic(expected = "slot 1 is not allocated")]
fn get_freed_slot_panics() {
    let mut allocator = Allocator::new();
    allocator.allocate(0);
    let address = allocator.allocate(1);
    allocator.deallocate(address);
    allocator.get(address);
}
