//! Per-draw-call bounds for one root and camera.

use ahash::AHashMap;
use tessera_batch::{CoplanarSetIdentifier, DrawCall};
use tessera_core::profiling::profile_function;
use tessera_core::{Aabb, BatchingConfig};

use crate::camera::CameraView;
use crate::gather::{GatheredSet, viewing_from_behind};
use crate::processed::ProcessedDrawCall;
use crate::resolve::{Resolution, nudged_distance};
use crate::runner::SortableRoot;

/// Sort-stage results the bounds pass reads from.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSets<'a> {
    /// Gathered sets in seed order.
    pub sets: &'a [GatheredSet],
    /// Index of each set in `sets`. Culled sets are absent.
    pub lookup: &'a AHashMap<CoplanarSetIdentifier, usize>,
    /// Resolved distance per entry of `sets`.
    pub resolution: &'a Resolution,
}

/// One [`ProcessedDrawCall`] per draw call of `root`, in draw call order.
///
/// 3D content gets plain world bounds. Flat content is moved along the
/// camera ray of its set to the set's resolved distance, then further in by
/// its order within the set.
pub fn compute_draw_call_bounds(
    camera: &CameraView,
    root: &SortableRoot<'_>,
    resolved: ResolvedSets<'_>,
    config: &BatchingConfig,
) -> Vec<ProcessedDrawCall> {
    profile_function!();

    root.batch
        .summary
        .draw_calls()
        .iter()
        .map(|dc| process_draw_call(camera, root, dc, resolved, config))
        .collect()
}

fn process_draw_call(
    camera: &CameraView,
    root: &SortableRoot<'_>,
    dc: &DrawCall,
    resolved: ResolvedSets<'_>,
    config: &BatchingConfig,
) -> ProcessedDrawCall {
    let Some(set) = root.batch.classification.coplanar_set(dc.coplanar_set) else {
        tracing::warn!(
            draw_call = dc.id.0,
            set = dc.coplanar_set.0,
            "Draw call references a missing coplanar set"
        );
        return ProcessedDrawCall::hidden(dc.bounds);
    };

    let world = dc.bounds.transformed(&set.local_to_world);
    if !world.is_finite() {
        tracing::warn!(draw_call = dc.id.0, "Draw call has non-finite world bounds");
        return ProcessedDrawCall::hidden(world);
    }

    let Some(order) = dc.transparent_order_in_set else {
        return ProcessedDrawCall::new(world, false);
    };

    let key = CoplanarSetIdentifier {
        root: root.id,
        set: set.id,
    };
    let Some(&node) = resolved.lookup.get(&key) else {
        // Culled during gather.
        let behind = viewing_from_behind(camera, set, set.render_bounds.center().z);
        return ProcessedDrawCall::new(world, behind);
    };

    let gathered = &resolved.sets[node];
    let nudged = nudged_distance(
        resolved.resolution.distances[node],
        order,
        config.depth_adjustment_ratio,
    );
    let direction = if camera.is_orthographic() {
        camera.forward()
    } else {
        (gathered.world_center - camera.position()).normalize_or_zero()
    };
    let offset = direction * (nudged - gathered.distances.center);
    let adjusted = Aabb::from_center_extents(world.center() + offset, world.extents());

    if !adjusted.is_finite() {
        tracing::warn!(draw_call = dc.id.0, "Adjusted draw call bounds are non-finite");
        return ProcessedDrawCall::hidden(world);
    }
    ProcessedDrawCall::new(adjusted, gathered.viewing_from_behind)
}
