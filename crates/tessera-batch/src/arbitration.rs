//! Draw-call arbitration.
//!
//! Elements are visited in z-layer order. Each one is placed in the earliest
//! draw call that
//!
//! - has the same `(descriptor, coplanar set)` key, and
//! - comes strictly after every draw call already holding something this
//!   element overlaps (or an earlier part of the same primitive).
//!
//! If no such draw call exists a new one is appended. Draw call ids only grow,
//! so "strictly after" in id order is the same as "submitted later", and one
//! forward pass over the draw calls draws every overlapping pair in order.

use std::ops::Range;

use ahash::AHashMap;
use tessera_core::profiling::{profile_function, profile_scope};
use tessera_core::{Aabb, BatchingConfig};

use crate::coplanar::{Classification, classify};
use crate::descriptor::VisualType;
use crate::draw_call::{DrawCall, DrawCallSummary};
use crate::error::{BatchError, BatchResult};
use crate::ids::{
    CoplanarSetId, DescriptorId, DrawCallId, PrimitiveIndex, RotationSetId, VisualElementIndex,
};
use crate::primitive::{Primitive, RootInput};
use crate::zlayer::ZLayerStore;

/// One renderable unit produced from a primitive part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualElement {
    /// Primitive the element was built from.
    pub source_index: PrimitiveIndex,
    /// Index into the renderer's per-type instance data. Written to the index buffer.
    pub render_type_index: u32,
    /// Interned batching key.
    pub descriptor: DescriptorId,
    /// Kind of content. Flat types take part in camera sorting.
    pub visual_type: VisualType,
    /// Coplanar set of the element's sub-root.
    pub coplanar_set: CoplanarSetId,
    /// Rotation set of the element's sub-root.
    pub rotation_set: RotationSetId,
    /// Explicit stacking order inherited from the primitive.
    pub z_index: i16,
    /// Position among the flat elements of the coplanar set, in draw order.
    pub order_in_set: Option<u32>,
    /// Bounds in coplanar-set space.
    pub set_bounds: Aabb,
}

/// Arbitration output for one batch root.
#[derive(Debug, Clone, Default)]
pub struct RootBatch {
    /// Elements in traversal order, indexed by [`VisualElementIndex`].
    pub elements: Vec<VisualElement>,
    /// Elements bucketed by z-index.
    pub layers: ZLayerStore,
    /// Draw call of each element; `None` for elements that were skipped.
    pub assigned: Vec<Option<DrawCallId>>,
    /// Draw calls, descriptors and index buffer handed to the renderer.
    pub summary: DrawCallSummary,
    /// Coplanar and rotation sets of the root's sub-roots.
    pub classification: Classification,
    /// Per-element failures that were logged and skipped.
    pub errors: Vec<BatchError>,
}

impl RootBatch {
    /// Draw call an element was merged into.
    pub fn draw_call_of(&self, element: VisualElementIndex) -> Option<DrawCallId> {
        self.assigned.get(element.index()).copied().flatten()
    }

    /// Elements produced from `primitive`, in part order.
    pub fn elements_of(
        &self,
        primitive: PrimitiveIndex,
    ) -> impl Iterator<Item = VisualElementIndex> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.source_index == primitive)
            .map(|(i, _)| VisualElementIndex::from(i))
    }
}

/// Build elements, z-layers and draw calls for one batch root.
pub fn build_root_batch(input: &RootInput, config: &BatchingConfig) -> RootBatch {
    profile_function!();

    let mut batch = RootBatch {
        classification: classify(&input.sub_roots, config),
        ..RootBatch::default()
    };

    let element_ranges = collect_elements(input, &mut batch);
    batch.layers.sort_layers();
    arbitrate(input, &element_ranges, &mut batch);

    tracing::debug!(
        primitives = input.primitives.len(),
        elements = batch.elements.len(),
        draw_calls = batch.summary.len(),
        coplanar_sets = batch.classification.coplanar_sets.len(),
        skipped = batch.errors.len(),
        "Arbitrated batch root"
    );

    batch
}

/// Create elements in traversal order and bucket them by z-index.
///
/// Returns the element range of every primitive slot.
fn collect_elements(input: &RootInput, batch: &mut RootBatch) -> Vec<Range<u32>> {
    profile_scope!("collect_elements");

    let mut ranges = vec![0..0; input.primitives.len()];
    let mut traversal: Vec<(PrimitiveIndex, &Primitive)> = input.primitives.iter().collect();
    traversal.sort_by_key(|(index, p)| (p.traversal_order, *index));

    for (index, primitive) in traversal {
        let start = batch.elements.len() as u32;
        for part in 0..primitive.parts.len() {
            match build_element(index, primitive, part, batch) {
                Ok(element) => {
                    let element_index = VisualElementIndex::from(batch.elements.len());
                    batch.layers.add_element(element_index, element.z_index);
                    batch.elements.push(element);
                }
                Err(err) => {
                    tracing::warn!("Skipping element: {}", err);
                    batch.errors.push(err);
                }
            }
        }
        ranges[index.index()] = start..batch.elements.len() as u32;
    }

    ranges
}

fn build_element(
    index: PrimitiveIndex,
    primitive: &Primitive,
    part: usize,
    batch: &mut RootBatch,
) -> BatchResult<VisualElement> {
    let part = &primitive.parts[part];
    let classification = &batch.classification;
    let missing = BatchError::MissingSubRoot {
        primitive: index,
        sub_root: primitive.sub_root,
    };
    let to_set = classification
        .to_set_space(primitive.sub_root)
        .ok_or_else(|| missing.clone())?;
    let coplanar_set = classification
        .coplanar_set_of(primitive.sub_root)
        .ok_or_else(|| missing.clone())?;
    let rotation_set = classification
        .rotation_set_of(primitive.sub_root)
        .ok_or(missing)?;

    let set_bounds = part.local_bounds.transformed(to_set);
    if !set_bounds.is_finite() {
        return Err(BatchError::NonFiniteBounds { primitive: index });
    }

    Ok(VisualElement {
        source_index: index,
        render_type_index: part.render_type_index,
        descriptor: batch.summary.descriptors.intern(part.descriptor),
        visual_type: part.descriptor.visual_type,
        coplanar_set,
        rotation_set,
        z_index: primitive.z_index,
        order_in_set: None,
        set_bounds,
    })
}

fn arbitrate(input: &RootInput, element_ranges: &[Range<u32>], batch: &mut RootBatch) {
    profile_scope!("arbitrate");

    batch.assigned = vec![None; batch.elements.len()];
    let mut by_key: AHashMap<(DescriptorId, CoplanarSetId), Vec<DrawCallId>> = AHashMap::new();
    let mut indices: Vec<Vec<u32>> = Vec::new();

    let order: Vec<VisualElementIndex> = batch.layers.iter().collect();
    for element_index in order {
        let element = batch.elements[element_index.index()];
        let floor = dependency_floor(input, element_ranges, batch, element_index, &element);
        let min_id = floor.map_or(0, |dc| dc.0 + 1);

        let candidates = by_key
            .entry((element.descriptor, element.coplanar_set))
            .or_default();
        let first = candidates.partition_point(|id| id.0 < min_id);
        let draw_call = match candidates.get(first) {
            Some(&id) => id,
            None => {
                let id = DrawCallId::from(batch.summary.draw_calls.len());
                let transparent_order_in_set = if element.visual_type.is_flat() {
                    batch
                        .classification
                        .coplanar_set_mut(element.coplanar_set)
                        .map(|set| {
                            let order = set.transparent_draw_call_count;
                            set.transparent_draw_call_count += 1;
                            order
                        })
                } else {
                    None
                };
                batch.summary.draw_calls.push(DrawCall {
                    id,
                    descriptor: element.descriptor,
                    coplanar_set: element.coplanar_set,
                    bounds: Aabb::EMPTY,
                    transparent_order_in_set,
                    instance_count: 0,
                });
                indices.push(Vec::new());
                candidates.push(id);
                id
            }
        };

        let dc = &mut batch.summary.draw_calls[draw_call.index()];
        dc.bounds.encapsulate(&element.set_bounds);
        dc.instance_count += 1;
        indices[draw_call.index()].push(element.render_type_index);

        if element.visual_type.is_flat()
            && let Some(set) = batch.classification.coplanar_set_mut(element.coplanar_set)
        {
            set.render_bounds.encapsulate(&element.set_bounds);
            batch.elements[element_index.index()].order_in_set =
                Some(set.transparent_element_count);
            set.transparent_element_count += 1;
        }

        batch.assigned[element_index.index()] = Some(draw_call);
        tracing::trace!(
            element = element_index.0,
            draw_call = draw_call.0,
            min_draw_call = min_id,
            "Assigned element"
        );
    }

    batch.summary.finalize(indices);
}

/// Latest draw call among the element's already-assigned dependencies.
fn dependency_floor(
    input: &RootInput,
    element_ranges: &[Range<u32>],
    batch: &RootBatch,
    element_index: VisualElementIndex,
    element: &VisualElement,
) -> Option<DrawCallId> {
    let assigned = |i: u32| batch.assigned.get(i as usize).copied().flatten();

    let own = element_ranges
        .get(element.source_index.index())
        .cloned()
        .unwrap_or(0..0);
    let mut floor = (element_index.0 > own.start)
        .then(|| assigned(element_index.0 - 1))
        .flatten();

    for other in input.primitives.overlaps(element.source_index) {
        let Some(range) = element_ranges.get(other.index()) else {
            continue;
        };
        for dep in range.clone() {
            floor = floor.max(assigned(dep));
        }
    }

    floor
}
