//! Draw calls and the per-root summary consumed by the renderer.
//!
//! The renderer issues one instanced draw per [`DrawCall`], in id order.
//! Each draw call's instances are the render-type indices stored in its
//! range of the flat index buffer.

use std::ops::Range;

use tessera_core::Aabb;

use crate::descriptor::{DescriptorCache, DrawCallDescriptor};
use crate::ids::{CoplanarSetId, DescriptorId, DrawCallId};

/// One instanced draw of elements sharing a descriptor and coplanar set.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Submission position within the root. Lower ids draw first.
    pub id: DrawCallId,
    /// Batching key shared by every instance.
    pub descriptor: DescriptorId,
    /// Coplanar set whose space `bounds` is expressed in.
    pub coplanar_set: CoplanarSetId,
    /// Union of the instances' bounds, in coplanar-set space.
    pub bounds: Aabb,
    /// Position among the flat draw calls of the coplanar set; `None` for 3D content.
    pub transparent_order_in_set: Option<u32>,
    /// Number of elements merged into this draw call.
    pub instance_count: u32,
}

impl DrawCall {
    /// Whether this draw call holds flat content that takes part in camera sorting.
    pub fn is_transparent(&self) -> bool {
        self.transparent_order_in_set.is_some()
    }
}

/// Ordered draw calls of one batch root plus their descriptors and index buffer.
#[derive(Debug, Clone, Default)]
pub struct DrawCallSummary {
    pub(crate) draw_calls: Vec<DrawCall>,
    pub(crate) descriptors: DescriptorCache,
    pub(crate) index_buffer: Vec<u32>,
    pub(crate) index_ranges: Vec<Range<u32>>,
}

impl DrawCallSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw calls in submission order.
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }

    /// Look up a draw call by id.
    pub fn draw_call(&self, id: DrawCallId) -> Option<&DrawCall> {
        self.draw_calls.get(id.index())
    }

    /// Descriptors interned while building this root.
    pub fn descriptors(&self) -> &DescriptorCache {
        &self.descriptors
    }

    /// Resolve a draw call's descriptor id.
    pub fn descriptor(&self, id: DescriptorId) -> Option<&DrawCallDescriptor> {
        self.descriptors.get(id)
    }

    /// Render-type indices of one draw call, in instance order.
    pub fn indices(&self, id: DrawCallId) -> &[u32] {
        self.index_ranges
            .get(id.index())
            .and_then(|range| self.index_buffer.get(range.start as usize..range.end as usize))
            .unwrap_or(&[])
    }

    /// The whole index buffer, laid out in draw call order.
    pub fn index_buffer(&self) -> &[u32] {
        &self.index_buffer
    }

    /// Range of [`index_buffer`](Self::index_buffer) holding the draw call's instances.
    pub fn index_range(&self, id: DrawCallId) -> Option<Range<u32>> {
        self.index_ranges.get(id.index()).cloned()
    }

    /// Number of draw calls.
    pub fn len(&self) -> usize {
        self.draw_calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draw_calls.is_empty()
    }

    /// Number of flat draw calls across all coplanar sets.
    pub fn transparent_count(&self) -> usize {
        self.draw_calls.iter().filter(|dc| dc.is_transparent()).count()
    }

    /// Flatten per-draw-call index lists into one buffer.
    pub(crate) fn finalize(&mut self, per_draw_call: Vec<Vec<u32>>) {
        self.index_buffer.clear();
        self.index_ranges.clear();
        self.index_buffer
            .reserve(per_draw_call.iter().map(Vec::len).sum());
        for indices in per_draw_call {
            let start = self.index_buffer.len() as u32;
            self.index_buffer.extend(indices);
            self.index_ranges.push(start..self.index_buffer.len() as u32);
        }
    }
}
