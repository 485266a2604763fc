//! Gather stage: flat coplanar sets as camera-space quads.

use glam::{Mat4, Vec3};
use tessera_batch::{CoplanarSet, CoplanarSetId, CoplanarSetIdentifier, HierarchyRootId};
use tessera_core::Rect2;
use tessera_core::profiling::profile_function;

use crate::camera::CameraView;
use crate::distance::{SetDistances, orthographic_distances, perspective_distances};
use crate::projection::ViewQuad;
use crate::runner::SortableRoot;
use crate::visibility::SortGroupInfo;

/// One coplanar set with transparent content, as seen by the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct GatheredSet {
    /// Owning root and set id. Orders sets when breaking cycles.
    pub key: CoplanarSetIdentifier,
    /// Index of the owning root in the slice passed to the runner.
    pub root: usize,
    /// Render bounds as a view-space quad.
    pub quad: ViewQuad,
    /// Screen footprint, or [`Rect2::NDC_FULL`] when partially behind the camera.
    pub ndc: Rect2,
    /// Camera distances of the quad before any nudging.
    pub distances: SetDistances,
    /// Whether the camera sees the back face of the set.
    pub viewing_from_behind: bool,
    /// Flat draw calls in the set, each taking one depth step.
    pub transparent_draw_calls: u32,
    /// Sort group of the owning root.
    pub sort_group: SortGroupInfo,
    /// Hierarchy the owning root belongs to. Hierarchy orders only compare within one.
    pub hierarchy_root: HierarchyRootId,
    /// Root traversal order, then set id.
    pub hierarchy_order: (u32, CoplanarSetId),
    /// Center of the render bounds in world space.
    pub world_center: Vec3,
}

/// Output of [`gather`].
#[derive(Debug, Clone, Default)]
pub struct Gathered {
    /// Surviving sets, in root order then set order.
    pub sets: Vec<GatheredSet>,
    /// Sets rejected as entirely behind the camera or numerically invalid.
    pub culled: usize,
}

/// Collect every coplanar set with transparent draw calls from the `selected` roots.
pub fn gather(camera: &CameraView, roots: &[SortableRoot<'_>], selected: &[usize]) -> Gathered {
    profile_function!();

    let view = camera.view_matrix();
    let projection = camera.projection_matrix();
    let mut out = Gathered::default();

    for &root_index in selected {
        let Some(root) = roots.get(root_index) else {
            continue;
        };
        for set in &root.batch.classification.coplanar_sets {
            if !set.has_transparent_content() || set.render_bounds.is_empty() {
                continue;
            }
            match gather_set(camera, &view, &projection, root, root_index, set) {
                Some(gathered) => out.sets.push(gathered),
                None => out.culled += 1,
            }
        }
    }

    tracing::trace!(
        camera = camera.id.0,
        gathered = out.sets.len(),
        culled = out.culled,
        "Gathered coplanar sets"
    );
    out
}

fn gather_set(
    camera: &CameraView,
    view: &Mat4,
    projection: &Mat4,
    root: &SortableRoot<'_>,
    root_index: usize,
    set: &CoplanarSet,
) -> Option<GatheredSet> {
    let bounds = set.render_bounds;
    let plane_z = bounds.center().z;
    let local = [
        Vec3::new(bounds.min.x, bounds.min.y, plane_z),
        Vec3::new(bounds.max.x, bounds.min.y, plane_z),
        Vec3::new(bounds.max.x, bounds.max.y, plane_z),
        Vec3::new(bounds.min.x, bounds.max.y, plane_z),
    ];
    let to_view = *view * set.local_to_world;
    let corners = local.map(|p| to_view.transform_point3(p));
    let center = to_view.transform_point3(bounds.center());

    if corners.iter().all(|c| -c.z <= 0.0) {
        return None;
    }
    if !corners.iter().all(|c| c.is_finite()) || !center.is_finite() {
        tracing::warn!(
            set = set.id.0,
            "Coplanar set has non-finite camera-space bounds, skipping"
        );
        return None;
    }

    let mut ndc = Rect2::EMPTY;
    for corner in &corners {
        let clip = *projection * corner.extend(1.0);
        if clip.w <= 0.0 {
            ndc = Rect2::NDC_FULL;
            break;
        }
        ndc.encapsulate_point(clip.truncate().truncate() / clip.w);
    }

    let distances = if camera.is_orthographic() {
        orthographic_distances(&corners, center)
    } else {
        perspective_distances(&corners, center)
    };

    Some(GatheredSet {
        key: CoplanarSetIdentifier {
            root: root.id,
            set: set.id,
        },
        root: root_index,
        quad: ViewQuad::new(corners),
        ndc,
        distances,
        viewing_from_behind: viewing_from_behind(camera, set, plane_z),
        transparent_draw_calls: set.transparent_draw_call_count,
        sort_group: root.info.sort_group,
        hierarchy_root: root.info.hierarchy_root,
        hierarchy_order: (root.info.hierarchy_order, set.id),
        world_center: set.local_to_world.transform_point3(bounds.center()),
    })
}

/// Whether the camera sees the back face of the set's plane.
///
/// The front face is the set's local `+Z` side. Orthographic cameras are
/// judged by view direction, perspective cameras by eye position.
pub fn viewing_from_behind(camera: &CameraView, set: &CoplanarSet, plane_z: f32) -> bool {
    if camera.is_orthographic() {
        set.world_to_local.transform_vector3(camera.forward()).z > 0.0
    } else {
        set.world_to_local.transform_point3(camera.position()).z < plane_z
    }
}

/// Sort gathered sets by ascending minimum distance.
///
/// Only a seed order for dependency discovery. Ties keep gather order.
pub fn sort_coplanar_sets(sets: &mut [GatheredSet]) {
    profile_function!();
    sets.sort_by(|a, b| a.distances.min.total_cmp(&b.distances.min));
}
