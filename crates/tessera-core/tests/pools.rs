//! Generational arena and swap-remove pool tests.
//!
//! These cover the two storage guarantees the batching context relies on:
//! stale root handles never resolve, and swap-remove reports every move.

use tessera_core::alloc::{IndexSlot, Relocation, SparseSet, SwapPool};

#[test]
fn test_push_and_get() {
    let mut set = SparseSet::new();

    let idx = set.push(42);
    assert_eq!(*set.get(idx), 42);

    let idx2 = set.push(100);
    assert_eq!(*set.get(idx2), 100);
    assert_eq!(*set.get(idx), 42);
}

#[test]
fn test_try_get_invalid_returns_none() {
    let set = SparseSet::<i32>::new();
    let invalid = IndexSlot::new(0, 999);
    assert_eq!(set.try_get(invalid), None);
}

#[test]
fn test_try_get_mut() {
    let mut set = SparseSet::new();
    let idx = set.push(1);
    if let Some(v) = set.try_get_mut(idx) {
        *v = 5;
    }
    assert_eq!(set.try_get(idx), Some(&5));
}

#[test]
#[should_panic(expected = "invalid generation")]
fn test_use_after_free_panics() {
    let mut set = SparseSet::new();
    let idx = set.push(42);
    set.remove(idx);
    let _ = set.get(idx);
}

#[test]
fn test_generation_increment_on_reuse() {
    let mut set = SparseSet::new();

    let idx0 = set.push(0);
    set.remove(idx0);
    let idx1 = set.push(1);
    set.remove(idx1);
    let idx2 = set.push(2);

    assert_eq!(idx2.index(), idx0.index());
    assert_eq!(idx2.generation(), 2);
    assert_eq!(set.try_get(idx0), None);
    assert_eq!(set.try_get(idx1), None);
    assert_eq!(*set.get(idx2), 2);
}

#[test]
fn test_len_tracks_live_values() {
    let mut set = SparseSet::new();
    let a = set.push(1);
    set.push(2);
    assert_eq!(set.len(), 2);
    set.remove(a);
    assert_eq!(set.len(), 1);
    assert_eq!(set.iter().count(), 1);
}

#[test]
fn test_swap_pool_fixup_keeps_references_valid() {
    // Simulates a table of records that point at each other by index.
    let mut pool = SwapPool::new();
    let names = ["a", "b", "c", "d", "e"];
    for n in names {
        pool.push(n);
    }
    // "links" stored by a caller: every entry references "e" (index 4).
    let mut links = vec![4u32, 4, 0, 2];

    let removed = pool.swap_remove(1).expect("in range");
    assert_eq!(removed.value, "b");
    let reloc = removed.relocated.expect("last element moved");
    assert_eq!(reloc, Relocation { from: 4, to: 1 });

    for link in &mut links {
        reloc.apply(link);
    }
    for link in links {
        assert!(pool.get(link).is_some());
    }
    assert_eq!(pool.get(1), Some(&"e"));
}
