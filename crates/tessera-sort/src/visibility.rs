//! Which roots a camera sorts, and the sort keys they carry.

use tessera_batch::{CameraId, HierarchyRootId};

use crate::camera::{CameraKind, CameraView};

/// How a batch root is bound to cameras.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RootVisibility {
    /// Seen by every camera.
    #[default]
    World,
    /// Rendered for one camera, plus any extra cameras it opts into.
    ScreenSpace {
        /// Camera the root was built for.
        target: CameraId,
        /// Other cameras that also render the root.
        additional: Vec<CameraId>,
    },
}

impl RootVisibility {
    /// Whether `camera` sorts and renders a root with this visibility.
    pub fn should_render(&self, camera: &CameraView) -> bool {
        if camera.kind == CameraKind::ScenePreview {
            return true;
        }
        match self {
            RootVisibility::World => true,
            RootVisibility::ScreenSpace { target, additional } => {
                *target == camera.id || additional.contains(&camera.id)
            }
        }
    }
}

/// Explicit ordering of a batch group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortGroupInfo {
    /// Higher renders over lower when two sets are coplanar.
    pub sort_order: i32,
    /// Sets in different queues never depend on each other.
    pub render_queue: i32,
}

impl SortGroupInfo {
    /// Group of roots without an explicit sort group.
    pub const DEFAULT: SortGroupInfo = SortGroupInfo {
        sort_order: 0,
        render_queue: 3000,
    };

    pub fn new(sort_order: i32, render_queue: i32) -> Self {
        Self {
            sort_order,
            render_queue,
        }
    }
}

impl Default for SortGroupInfo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-root inputs of the camera sort besides its batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RootSortInfo {
    /// Cameras the root renders for.
    pub visibility: RootVisibility,
    /// Resolved sort group, [`SortGroupInfo::DEFAULT`] when none is assigned.
    pub sort_group: SortGroupInfo,
    /// Hierarchy the root belongs to.
    pub hierarchy_root: HierarchyRootId,
    /// Traversal position of the root within its hierarchy.
    pub hierarchy_order: u32,
}
