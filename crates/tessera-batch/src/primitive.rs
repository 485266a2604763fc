//! Primitive input tables fed by the hierarchy and overlap providers.
//!
//! The table is struct-of-arrays over [`SwapPool`] columns. Removal is a
//! swap-remove: the last primitive moves into the freed slot, so every
//! stored [`PrimitiveIndex`] that named the old last slot must be rewritten.
//! [`PrimitiveTable::remove`] does this for the overlap lists it owns and
//! returns the [`Relocation`] so the caller can fix up its own handles.

use glam::Mat4;
use tessera_core::Aabb;
use tessera_core::alloc::{Relocation, SwapPool};

use crate::descriptor::DrawCallDescriptor;
use crate::error::{BatchError, BatchResult};
use crate::ids::{PrimitiveIndex, SubRootIndex};

/// A node whose transform anchors a group of primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubRoot {
    /// Local-to-world matrix.
    pub world: Mat4,
    /// Position in hierarchy traversal.
    pub traversal_order: u32,
}

impl SubRoot {
    pub fn new(world: Mat4, traversal_order: u32) -> Self {
        Self {
            world,
            traversal_order,
        }
    }
}

/// One renderable piece of a primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualPart {
    /// Batching key of the part.
    pub descriptor: DrawCallDescriptor,
    /// Index into the per-visual-type instance buffer.
    pub render_type_index: u32,
    /// Bounds in the owning sub-root's local space.
    pub local_bounds: Aabb,
}

impl VisualPart {
    pub fn new(descriptor: DrawCallDescriptor, render_type_index: u32, local_bounds: Aabb) -> Self {
        Self {
            descriptor,
            render_type_index,
            local_bounds,
        }
    }
}

/// A block, with its shadow and text, as laid out by the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    /// Sub-root whose transform the parts are laid out in.
    pub sub_root: SubRootIndex,
    /// Hierarchy traversal position; elements are emitted in this order.
    pub traversal_order: u32,
    /// Explicit stacking order. Lower layers draw first.
    pub z_index: i16,
    /// Parts in intrinsic draw order (shadow, body, text).
    pub parts: Vec<VisualPart>,
}

impl Primitive {
    /// Primitive with no parts yet.
    pub fn new(sub_root: SubRootIndex, traversal_order: u32, z_index: i16) -> Self {
        Self {
            sub_root,
            traversal_order,
            z_index,
            parts: Vec::new(),
        }
    }

    /// Primitive with exactly one part.
    pub fn single(
        sub_root: SubRootIndex,
        traversal_order: u32,
        z_index: i16,
        part: VisualPart,
    ) -> Self {
        Self {
            sub_root,
            traversal_order,
            z_index,
            parts: vec![part],
        }
    }

    /// Append a part, drawn after the existing ones.
    pub fn with_part(mut self, part: VisualPart) -> Self {
        self.parts.push(part);
        self
    }
}

/// Struct-of-arrays primitive storage with overlap lists.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveTable {
    primitives: SwapPool<Primitive>,
    overlaps: SwapPool<Vec<PrimitiveIndex>>,
}

impl PrimitiveTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a primitive with an empty overlap list.
    pub fn insert(&mut self, primitive: Primitive) -> PrimitiveIndex {
        let index = self.primitives.push(primitive);
        self.overlaps.push(Vec::new());
        PrimitiveIndex(index)
    }

    pub fn get(&self, index: PrimitiveIndex) -> Option<&Primitive> {
        self.primitives.get(index.0)
    }

    /// Replace a primitive, keeping its overlap list.
    pub fn update(&mut self, index: PrimitiveIndex, primitive: Primitive) -> BatchResult<()> {
        let slot = self
            .primitives
            .get_mut(index.0)
            .ok_or(BatchError::MissingPrimitive(index))?;
        *slot = primitive;
        Ok(())
    }

    /// Replace the overlap list of `index`.
    ///
    /// Entries naming missing primitives or `index` itself are dropped.
    pub fn set_overlaps(
        &mut self,
        index: PrimitiveIndex,
        overlaps: impl IntoIterator<Item = PrimitiveIndex>,
    ) -> BatchResult<()> {
        let len = self.primitives.len() as u32;
        let list = self
            .overlaps
            .get_mut(index.0)
            .ok_or(BatchError::MissingPrimitive(index))?;
        list.clear();
        list.extend(
            overlaps
                .into_iter()
                .filter(|other| other.0 < len && *other != index),
        );
        list.sort_unstable();
        list.dedup();
        Ok(())
    }

    /// Overlap dependencies of `index`. Unknown indices have none.
    pub fn overlaps(&self, index: PrimitiveIndex) -> &[PrimitiveIndex] {
        self.overlaps
            .get(index.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Swap-remove a primitive.
    ///
    /// Overlap entries pointing at the removed primitive are dropped and
    /// entries pointing at the relocated one are rewritten.
    pub fn remove(&mut self, index: PrimitiveIndex) -> BatchResult<(Primitive, Option<Relocation>)> {
        let removed = self
            .primitives
            .swap_remove(index.0)
            .ok_or(BatchError::MissingPrimitive(index))?;
        self.overlaps.swap_remove(index.0);

        for list in self.overlaps.iter_mut() {
            list.retain(|other| *other != index);
            if let Some(reloc) = removed.relocated {
                for other in list.iter_mut() {
                    reloc.apply(&mut other.0);
                }
                list.sort_unstable();
            }
        }

        Ok((removed.value, removed.relocated))
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Primitives in storage order, which is not traversal order after removals.
    pub fn iter(&self) -> impl Iterator<Item = (PrimitiveIndex, &Primitive)> {
        self.primitives
            .iter()
            .enumerate()
            .map(|(i, p)| (PrimitiveIndex::from(i), p))
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
        self.overlaps.clear();
    }
}

/// Everything arbitration needs to know about one batch root.
#[derive(Debug, Clone)]
pub struct RootInput {
    /// Sub-roots; index 0 is the batch root itself.
    pub sub_roots: Vec<SubRoot>,
    /// Primitives and their overlap lists.
    pub primitives: PrimitiveTable,
}

impl RootInput {
    /// Input with an identity-transformed batch root and no primitives.
    pub fn new() -> Self {
        Self::with_root_transform(Mat4::IDENTITY)
    }

    /// Input whose batch root sits at `world`.
    pub fn with_root_transform(world: Mat4) -> Self {
        Self {
            sub_roots: vec![SubRoot::new(world, 0)],
            primitives: PrimitiveTable::new(),
        }
    }

    /// Append a sub-root and return its index.
    pub fn add_sub_root(&mut self, sub_root: SubRoot) -> SubRootIndex {
        let index = SubRootIndex::from(self.sub_roots.len());
        self.sub_roots.push(sub_root);
        index
    }

    pub fn sub_root(&self, index: SubRootIndex) -> Option<&SubRoot> {
        self.sub_roots.get(index.index())
    }
}

impl Default for RootInput {
    fn default() -> Self {
        Self::new()
    }
}
