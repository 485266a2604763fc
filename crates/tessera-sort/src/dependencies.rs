//! Dependency discovery between gathered sets.

use tessera_core::BatchingConfig;
use tessera_core::math::approx_eq;
use tessera_core::profiling::profile_function;

use crate::camera::CameraView;
use crate::gather::GatheredSet;
use crate::graph::RenderGraph;
use crate::projection::{QuadOrder, compare_quads};

/// Whether two sets could possibly need ordering against each other.
pub fn may_overlap(a: &GatheredSet, b: &GatheredSet) -> bool {
    a.transparent_draw_calls > 0
        && b.transparent_draw_calls > 0
        && a.distances.is_finite()
        && b.distances.is_finite()
        && a.sort_group.render_queue == b.sort_group.render_queue
        && a.ndc.intersects(&b.ndc)
}

/// Decide whether `a` renders over `b` when their quads cannot tell.
///
/// `a` must come before `b` in seed order.
pub fn coplanar_tie_break(a: &GatheredSet, b: &GatheredSet, epsilon: f32) -> bool {
    let initial = if approx_eq(a.distances.center, b.distances.center, epsilon) {
        false
    } else {
        a.distances.center < b.distances.center
    };
    let both_behind = a.viewing_from_behind && b.viewing_from_behind;

    let over = if a.sort_group.sort_order != b.sort_group.sort_order {
        a.sort_group.sort_order > b.sort_group.sort_order
    } else if a.hierarchy_root == b.hierarchy_root && a.hierarchy_order != b.hierarchy_order {
        a.hierarchy_order > b.hierarchy_order
    } else if both_behind {
        !initial
    } else {
        initial
    };

    if both_behind { !over } else { over }
}

/// Build the renders-over graph over `sets`, which must be in seed order.
pub fn discover_dependencies(
    camera: &CameraView,
    sets: &[GatheredSet],
    config: &BatchingConfig,
) -> RenderGraph {
    profile_function!();

    let orthographic = camera.is_orthographic();
    let epsilon = config.coplanar_sort_epsilon;
    let mut graph = RenderGraph::new(sets.len());

    for (i, a) in sets.iter().enumerate() {
        for (j, b) in sets.iter().enumerate().skip(i + 1) {
            if !may_overlap(a, b) {
                continue;
            }
            let a_over = match compare_quads(&a.quad, &b.quad, orthographic, epsilon) {
                QuadOrder::Disjoint => continue,
                QuadOrder::FirstOver => true,
                QuadOrder::SecondOver => false,
                QuadOrder::Coplanar => coplanar_tie_break(a, b, epsilon),
            };
            let (over, under) = if a_over { (i, j) } else { (j, i) };
            graph.add_edge(over, under);
            tracing::trace!(
                over = ?sets[over].key,
                under = ?sets[under].key,
                "Renders-over edge"
            );
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use tessera_batch::{BatchRootId, CoplanarSetId, CoplanarSetIdentifier, HierarchyRootId};
    use tessera_core::Rect2;
    use tessera_core::alloc::IndexSlot;

    use crate::distance::SetDistances;
    use crate::projection::ViewQuad;
    use crate::visibility::SortGroupInfo;

    fn set(root: u32, center: f32, behind: bool) -> GatheredSet {
        GatheredSet {
            key: CoplanarSetIdentifier {
                root: BatchRootId::from_slot(IndexSlot::new(0, root)),
                set: CoplanarSetId(0),
            },
            root: root as usize,
            quad: ViewQuad::new([Vec3::ZERO; 4]),
            ndc: Rect2::NDC_FULL,
            distances: SetDistances {
                min: center,
                max: center,
                center,
            },
            viewing_from_behind: behind,
            transparent_draw_calls: 1,
            sort_group: SortGroupInfo::DEFAULT,
            hierarchy_root: HierarchyRootId(0),
            hierarchy_order: (root, CoplanarSetId(0)),
            world_center: Vec3::ZERO,
        }
    }

    #[test]
    fn test_closer_center_renders_over() {
        let mut a = set(0, 10.0, false);
        let mut b = set(1, 12.0, false);
        a.hierarchy_root = HierarchyRootId(1);
        b.hierarchy_root = HierarchyRootId(2);
        assert!(coplanar_tie_break(&a, &b, 1e-4));
        assert!(!coplanar_tie_break(&b, &a, 1e-4));
    }

    #[test]
    fn test_equal_distance_prefers_later() {
        let mut a = set(0, 10.0, false);
        let mut b = set(1, 10.0, false);
        a.hierarchy_root = HierarchyRootId(1);
        b.hierarchy_root = HierarchyRootId(2);
        assert!(!coplanar_tie_break(&a, &b, 1e-4));
    }

    #[test]
    fn test_sort_order_wins_and_flips_from_behind() {
        let mut a = set(0, 10.0, false);
        let b = set(1, 5.0, false);
        a.sort_group.sort_order = 2;
        assert!(coplanar_tie_break(&a, &b, 1e-4));

        a.viewing_from_behind = true;
        let mut b = b;
        b.viewing_from_behind = true;
        assert!(!coplanar_tie_break(&a, &b, 1e-4));
    }

    #[test]
    fn test_double_flip_from_behind() {
        let mut a = set(0, 10.0, true);
        let mut b = set(1, 12.0, true);
        a.hierarchy_order = b.hierarchy_order;
        let front = {
            let (mut a, mut b) = (a.clone(), b.clone());
            a.viewing_from_behind = false;
            b.viewing_from_behind = false;
            coplanar_tie_break(&a, &b, 1e-4)
        };
        assert_eq!(coplanar_tie_break(&a, &b, 1e-4), front);
        b.viewing_from_behind = false;
        assert_eq!(coplanar_tie_break(&a, &b, 1e-4), front);
    }

    #[test]
    fn test_sets_of_one_root_are_compared() {
        let a = set(0, 10.0, false);
        let mut b = set(0, 12.0, false);
        b.key.set = CoplanarSetId(1);
        b.hierarchy_order = (0, CoplanarSetId(1));
        assert_eq!(a.key.root, b.key.root);
        assert!(may_overlap(&a, &b));
    }

    #[test]
    fn test_skip_rules() {
        let a = set(0, 10.0, false);
        let mut b = set(1, 12.0, false);
        assert!(may_overlap(&a, &b));

        b.transparent_draw_calls = 0;
        assert!(!may_overlap(&a, &b));
        b.transparent_draw_calls = 1;

        b.distances.center = f32::NAN;
        assert!(!may_overlap(&a, &b));
        b.distances.center = 12.0;

        b.ndc = Rect2::from_min_max(glam::Vec2::splat(2.0), glam::Vec2::splat(3.0));
        assert!(!may_overlap(&a, &b));
    }
}
