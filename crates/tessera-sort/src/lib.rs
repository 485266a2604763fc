//! Tessera Sort
//!
//! Per-camera render-order resolution for flat, transparent content.
//!
//! All instances of a draw call are drawn in one go, so two overlapping
//! coplanar sets from different draw calls must reach the depth test in a
//! known order. The runner finds which set renders over which from the
//! camera's point of view, resolves that graph, and nudges each flat draw
//! call's bounds toward the camera by a small, ordered amount.
//!
//! # Stages
//!
//! 1. [`select_roots`]: visibility rules per camera.
//! 2. [`gather`]: coplanar sets with transparent draw calls as view-space quads.
//! 3. [`sort_coplanar_sets`]: seed order by minimum distance.
//! 4. [`discover_dependencies`]: renders-over edges between overlapping sets.
//! 5. [`resolve`]: topological order and resolved distances; cycles are broken.
//! 6. [`compute_draw_call_bounds`]: one [`ProcessedDrawCall`] per draw call.

pub mod bounds;
pub mod camera;
pub mod dependencies;
pub mod distance;
pub mod error;
pub mod gather;
pub mod graph;
pub mod processed;
pub mod projection;
pub mod resolve;
pub mod runner;
pub mod visibility;

pub use bounds::{ResolvedSets, compute_draw_call_bounds};
pub use camera::{CameraKind, CameraView, ProjectionMode};
pub use dependencies::{coplanar_tie_break, discover_dependencies};
pub use error::{SortError, SortResult};
pub use gather::{Gathered, GatheredSet, gather, sort_coplanar_sets};
pub use graph::{RenderGraph, ResolvedOrder};
pub use processed::{DrawCallUniform, ProcessedDrawCall};
pub use resolve::{Resolution, resolve};
pub use runner::{CameraSortRunner, SortStats, SortableRoot, select_roots};
pub use visibility::{RootSortInfo, RootVisibility, SortGroupInfo};
