//! Tessera - batched UI rendering order
//!
//! Tessera turns retained UI content into as few instanced draw calls as
//! possible while keeping overlapping content in the right order, then
//! resolves, per camera, how transparent coplanar content from different
//! roots stacks in depth.
//!
//! - **Batching** ([`tessera_batch`]): z-layers, coplanar sets and draw-call arbitration
//! - **Sorting** ([`tessera_sort`]): per-camera renders-over graph and depth nudging
//! - **Context** ([`BatchingContext`]): root lifecycle, dirty tracking, frame driving
//!
//! # Quick Start
//!
//! ```
//! use tessera::prelude::*;
//!
//! let mut ctx = BatchingContext::default();
//! let root = ctx.create_root(RootSettings::default());
//! ctx.insert_primitive(
//!     root,
//!     Primitive::single(
//!         SubRootIndex::ROOT,
//!         0,
//!         0,
//!         VisualPart::new(
//!             DrawCallDescriptor::block_2d(),
//!             0,
//!             Aabb::from_rect(-5.0, -5.0, 10.0, 10.0, 0.0),
//!         ),
//!     ),
//! )
//! .unwrap();
//!
//! ctx.process_dirty_roots();
//!
//! let mut camera = CameraView::perspective(CameraId(0), 60.0, 1.0, 0.1, 100.0);
//! camera.look_at(glam::Vec3::new(0.0, 0.0, 20.0), glam::Vec3::ZERO, glam::Vec3::Y);
//! let stats = ctx.sort_camera(&camera).unwrap();
//! assert_eq!(stats.draw_calls, 1);
//!
//! let bounds = ctx.get_draw_call_bounds(CameraId(0), root).unwrap();
//! assert!(bounds[0].render);
//! ```

pub mod context;
pub mod task_pool;

pub use tessera_core::{logging, profiling};

pub use context::{BatchingContext, ContextError, ContextResult, RootSettings};
pub use task_pool::TaskPool;

pub mod prelude {
    pub use crate::context::{BatchingContext, ContextError, RootSettings};
    pub use crate::task_pool::TaskPool;

    pub use tessera_batch::{
        BatchRootId, CameraId, DrawCallDescriptor, DrawCallSummary, HierarchyRootId, Primitive,
        PrimitiveIndex, SortGroupId, SubRoot, SubRootIndex, VisualPart,
    };
    pub use tessera_core::{Aabb, BatchingConfig};
    pub use tessera_sort::{
        CameraKind, CameraView, ProcessedDrawCall, RootVisibility, SortGroupInfo, SortStats,
    };
}
