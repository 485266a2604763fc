//! Z-layer buckets for one batch root.
//!
//! Elements are bucketed by their explicit z-index. Within a bucket they stay
//! in insertion (hierarchy traversal) order; buckets are ordered by key after
//! [`ZLayerStore::sort_layers`]. The store is rebuilt from scratch every time
//! its root is reprocessed, so there is no removal.

use ahash::AHashMap;

use crate::ids::VisualElementIndex;

/// All elements sharing one z-index, in traversal order.
#[derive(Debug, Clone, PartialEq)]
pub struct ZLayer {
    /// The z-index shared by every element of the layer.
    pub key: i16,
    /// Elements in hierarchy traversal order.
    pub elements: Vec<VisualElementIndex>,
}

/// Z-layers of one batch root, iterable in either direction.
#[derive(Debug, Clone)]
pub struct ZLayerStore {
    layers: Vec<ZLayer>,
    lookup: AHashMap<i16, usize>,
    element_count: usize,
    sorted: bool,
}

impl ZLayerStore {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            lookup: AHashMap::new(),
            element_count: 0,
            sorted: true,
        }
    }

    /// Append `element` to the layer for `z_index`, creating it if needed.
    ///
    /// New layers are appended unsorted; call [`sort_layers`](Self::sort_layers)
    /// once after a batch of insertions.
    pub fn add_element(&mut self, element: VisualElementIndex, z_index: i16) {
        let slot = match self.lookup.get(&z_index) {
            Some(&slot) => slot,
            None => {
                let slot = self.layers.len();
                if self.layers.last().is_some_and(|last| last.key > z_index) {
                    self.sorted = false;
                }
                self.layers.push(ZLayer {
                    key: z_index,
                    elements: Vec::new(),
                });
                self.lookup.insert(z_index, slot);
                slot
            }
        };
        self.layers[slot].elements.push(element);
        self.element_count += 1;
    }

    /// Order layers by ascending key.
    pub fn sort_layers(&mut self) {
        if self.sorted {
            return;
        }
        self.layers.sort_by_key(|layer| layer.key);
        self.lookup.clear();
        for (slot, layer) in self.layers.iter().enumerate() {
            self.lookup.insert(layer.key, slot);
        }
        self.sorted = true;
    }

    /// Whether the layers are currently in ascending key order.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Layers in ascending key order once [`sort_layers`](Self::sort_layers) has run.
    pub fn layers(&self) -> &[ZLayer] {
        &self.layers
    }

    /// The layer for `z_index`, if any element was added with it.
    pub fn layer(&self, z_index: i16) -> Option<&ZLayer> {
        self.lookup.get(&z_index).map(|&slot| &self.layers[slot])
    }

    /// Total number of elements across all layers.
    pub fn len(&self) -> usize {
        self.element_count
    }

    pub fn is_empty(&self) -> bool {
        self.element_count == 0
    }

    /// Remove every layer, keeping allocations.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.lookup.clear();
        self.element_count = 0;
        self.sorted = true;
    }

    /// All elements, ascending z then insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = VisualElementIndex> + '_ {
        self.layers
            .iter()
            .flat_map(|layer| layer.elements.iter().copied())
    }

    /// All elements, descending z then reverse insertion order.
    pub fn iter_rev(&self) -> impl Iterator<Item = VisualElementIndex> + '_ {
        self.iter().rev()
    }
}

impl Default for ZLayerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(i: u32) -> VisualElementIndex {
        VisualElementIndex(i)
    }

    #[test]
    fn test_forward_order() {
        let mut store = ZLayerStore::new();
        store.add_element(e(0), 5);
        store.add_element(e(1), -2);
        store.add_element(e(2), 5);
        store.add_element(e(3), 0);
        assert!(!store.is_sorted());
        store.sort_layers();

        let order: Vec<u32> = store.iter().map(|i| i.0).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
        let keys: Vec<i16> = store.layers().iter().map(|l| l.key).collect();
        assert_eq!(keys, vec![-2, 0, 5]);
    }

    #[test]
    fn test_reverse_order() {
        let mut store = ZLayerStore::new();
        store.add_element(e(0), 1);
        store.add_element(e(1), 0);
        store.add_element(e(2), 1);
        store.sort_layers();

        let order: Vec<u32> = store.iter_rev().map(|i| i.0).collect();
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn test_lookup_survives_sort() {
        let mut store = ZLayerStore::new();
        store.add_element(e(0), 3);
        store.add_element(e(1), 1);
        store.sort_layers();
        store.add_element(e(2), 3);

        assert_eq!(store.layer(3).map(|l| l.elements.clone()), Some(vec![e(0), e(2)]));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_ascending_inserts_stay_sorted() {
        let mut store = ZLayerStore::new();
        store.add_element(e(0), 0);
        store.add_element(e(1), 1);
        store.add_element(e(2), 1);
        assert!(store.is_sorted());
    }
}
