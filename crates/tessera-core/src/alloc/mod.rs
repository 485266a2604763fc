//! Pooled storage used by the batching context.
//!
//! - Re-exports of the AHash collections used throughout the workspace
//! - [`SparseSet`](sparse_set::SparseSet): generational arena for long-lived records
//! - [`SwapPool`](swap_pool::SwapPool): dense storage with swap-remove and explicit relocation

pub mod sparse_set;
pub mod swap_pool;

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
pub use sparse_set::{IndexSlot, SparseSet};
pub use swap_pool::{Relocation, SwapPool, SwapRemoved};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_ahash() {
        let mut map = HashMap::new();
        map.insert(3u32, "root");
        assert_eq!(map.get(&3), Some(&"root"));
    }

    #[test]
    fn test_hashset_ahash() {
        let mut set = HashSet::new();
        set.insert(42u32);
        assert!(set.contains(&42));
    }
}
