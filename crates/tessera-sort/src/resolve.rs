//! Resolve stage: turn the renders-over graph into depth offsets.
//!
//! Each set gets a resolved distance no farther than its own center
//! distance and strictly closer than every draw call of every set it
//! renders over. Draw call `k` of a set then sits `k` steps closer still.

use tessera_batch::CoplanarSetIdentifier;
use tessera_core::BatchingConfig;
use tessera_core::profiling::profile_function;

use crate::gather::GatheredSet;
use crate::graph::RenderGraph;

/// Size of one depth nudge at `distance`.
#[inline]
pub fn depth_step(distance: f32, ratio: f32) -> f32 {
    ratio * distance.abs().max(1.0)
}

/// Distance of the `order`-th flat draw call of a set resolved to `resolved`.
#[inline]
pub fn nudged_distance(resolved: f32, order: u32, ratio: f32) -> f32 {
    resolved - depth_step(resolved, ratio) * order as f32
}

/// Output of [`resolve`].
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Draw order of the gathered sets, dependencies first.
    pub order: Vec<usize>,
    /// Resolved distance per gathered set.
    pub distances: Vec<f32>,
    /// Renders-over edges dropped to break cycles, as `(over, under)`.
    pub broken_edges: Vec<(CoplanarSetIdentifier, CoplanarSetIdentifier)>,
}

/// Order `sets` along the graph and assign each a resolved distance.
///
/// Cycles are broken deterministically and each broken edge is logged.
pub fn resolve(
    graph: &mut RenderGraph,
    sets: &[GatheredSet],
    config: &BatchingConfig,
) -> Resolution {
    profile_function!();

    let keys: Vec<CoplanarSetIdentifier> = sets.iter().map(|s| s.key).collect();
    let resolved = graph.resolve_order(&keys);
    let broken_edges: Vec<_> = resolved
        .broken
        .iter()
        .map(|&(over, under)| (keys[over], keys[under]))
        .collect();
    for (over, under) in &broken_edges {
        tracing::warn!(?over, ?under, "Broke renders-over cycle");
    }

    let ratio = config.depth_adjustment_ratio;
    let mut distances: Vec<f32> = sets.iter().map(|s| s.distances.center).collect();
    for &node in &resolved.order {
        let mut distance = sets[node].distances.center;
        for &dep in graph.dependencies(node) {
            let safe = nudged_distance(distances[dep], sets[dep].transparent_draw_calls, ratio);
            distance = distance.min(safe);
        }
        distances[node] = distance;
    }

    Resolution {
        order: resolved.order,
        distances,
        broken_edges,
    }
}
