//! Dense storage with swap-remove.
//!
//! Removing index `i` moves the last element into slot `i`. Any index the
//! caller stored that pointed at the old last slot is now wrong; the
//! returned [`Relocation`] says which index to rewrite. Callers that keep
//! cross-references (overlap lists, external handles) must apply it before
//! touching the pool again.

/// An element moved from `from` to `to` by a swap-remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relocation {
    /// Index the element used to live at.
    pub from: u32,
    /// Index it lives at now.
    pub to: u32,
}

/// Result of [`SwapPool::swap_remove`].
#[derive(Debug)]
pub struct SwapRemoved<T> {
    /// The removed element.
    pub value: T,
    /// `None` when the removed element was already the last one.
    pub relocated: Option<Relocation>,
}

/// A `Vec` that only removes by swapping in the last element.
#[derive(Debug, Clone)]
pub struct SwapPool<T> {
    items: Vec<T>,
}

impl<T> SwapPool<T> {
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Append a value and return its index.
    pub fn push(&mut self, value: T) -> u32 {
        let index = self.items.len() as u32;
        self.items.push(value);
        index
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        self.items.get(index as usize)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.items.get_mut(index as usize)
    }

    /// Remove `index`, moving the last element into its slot.
    pub fn swap_remove(&mut self, index: u32) -> Option<SwapRemoved<T>> {
        let len = self.items.len() as u32;
        if index >= len {
            return None;
        }
        let last = len - 1;
        let value = self.items.swap_remove(index as usize);
        let relocated = (index != last).then_some(Relocation {
            from: last,
            to: index,
        });
        Some(SwapRemoved { value, relocated })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }
}

impl<T> Default for SwapPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl Relocation {
    /// Rewrite `index` if it referred to the relocated slot.
    #[inline]
    pub fn apply(&self, index: &mut u32) {
        if *index == self.from {
            *index = self.to;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_middle_relocates_last() {
        let mut pool = SwapPool::new();
        for v in ["a", "b", "c", "d"] {
            pool.push(v);
        }

        let removed = pool.swap_remove(1).expect("index in range");
        assert_eq!(removed.value, "b");
        assert_eq!(removed.relocated, Some(Relocation { from: 3, to: 1 }));
        assert_eq!(pool.as_slice(), &["a", "d", "c"]);
    }

    #[test]
    fn test_remove_last_does_not_relocate() {
        let mut pool = SwapPool::new();
        pool.push(1);
        pool.push(2);

        let removed = pool.swap_remove(1).expect("index in range");
        assert_eq!(removed.value, 2);
        assert!(removed.relocated.is_none());
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut pool: SwapPool<u8> = SwapPool::new();
        assert!(pool.swap_remove(0).is_none());
    }

    #[test]
    fn test_relocation_apply() {
        let reloc = Relocation { from: 7, to: 2 };
        let mut a = 7;
        let mut b = 5;
        reloc.apply(&mut a);
        reloc.apply(&mut b);
        assert_eq!((a, b), (2, 5));
    }
}
