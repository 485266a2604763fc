//! Index newtypes.
//!
//! Everything per root is stored in flat arrays and cross-referenced by
//! index; these wrappers keep the different index spaces apart.

use tessera_core::alloc::IndexSlot;

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(value: usize) -> Self {
                Self(value as u32)
            }
        }
    };
}

index_type!(
    /// Index of a visual element inside one root's element list.
    VisualElementIndex
);
index_type!(
    /// Slot of a primitive in a root's [`PrimitiveTable`](crate::PrimitiveTable).
    PrimitiveIndex
);
index_type!(
    /// Index into a root's sub-root list. `0` is the batch root itself.
    SubRootIndex
);
index_type!(
    /// Interned [`DrawCallDescriptor`](crate::DrawCallDescriptor) of one root.
    DescriptorId
);
index_type!(
    /// Draw call id. Ids increase with creation order, which is also submission order.
    DrawCallId
);
index_type!(
    /// Coplanar set within one root. `0` is always the batch root's own plane.
    CoplanarSetId
);
index_type!(
    /// Rotation set within one root.
    RotationSetId
);
index_type!(
    /// Camera identity supplied by the host.
    CameraId
);
index_type!(
    /// Top of the hierarchy a batch root lives under.
    HierarchyRootId
);
index_type!(
    /// Batch-group sort order table key.
    SortGroupId
);

impl SubRootIndex {
    /// The batch root itself.
    pub const ROOT: SubRootIndex = SubRootIndex(0);
}

impl CoplanarSetId {
    /// The set seeded by the batch root.
    pub const ROOT: CoplanarSetId = CoplanarSetId(0);
}

/// Handle to a batch root owned by the batching context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchRootId(IndexSlot);

impl BatchRootId {
    /// Wrap an arena slot.
    pub fn from_slot(slot: IndexSlot) -> Self {
        Self(slot)
    }

    /// Arena slot, including its generation.
    pub fn slot(self) -> IndexSlot {
        self.0
    }
}

/// A coplanar set of a specific root.
///
/// The derived ordering (root, then set) is the deterministic key used when a
/// renders-over cycle has to be broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoplanarSetIdentifier {
    /// Root owning the set.
    pub root: BatchRootId,
    /// Set within that root.
    pub set: CoplanarSetId,
}
