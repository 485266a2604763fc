//! Tessera Batch
//!
//! Turns the primitives of one batch root into the smallest ordered list of
//! instanced draw calls that still draws overlapping content in the right
//! order.
//!
//! # Pipeline
//!
//! 1. [`coplanar::classify`] groups the root's sub-roots into coplanar and
//!    rotation sets.
//! 2. Every [`Primitive`] part becomes a [`VisualElement`] and is bucketed
//!    into the [`ZLayerStore`] by its z-index.
//! 3. [`arbitration`] walks the layers in order and assigns each element to
//!    a [`DrawCall`], never earlier than the draw calls of the elements it
//!    overlaps.
//!
//! The result, a [`RootBatch`], is plain data. Nothing in this crate shares
//! mutable state between roots, so roots can be processed in parallel.
//!
//! # Example
//!
//! ```
//! use tessera_batch::*;
//! use tessera_core::{Aabb, BatchingConfig};
//!
//! let mut input = RootInput::new();
//! let quad = DrawCallDescriptor::block_2d();
//! input.primitives.insert(Primitive::single(
//!     SubRootIndex::ROOT,
//!     0,
//!     0,
//!     VisualPart::new(quad, 0, Aabb::from_rect(0.0, 0.0, 10.0, 10.0, 0.0)),
//! ));
//!
//! let batch = build_root_batch(&input, &BatchingConfig::default());
//! assert_eq!(batch.summary.len(), 1);
//! ```

pub mod arbitration;
pub mod coplanar;
pub mod descriptor;
pub mod draw_call;
pub mod error;
pub mod ids;
pub mod primitive;
pub mod zlayer;

pub use arbitration::{RootBatch, VisualElement, build_root_batch};
pub use coplanar::{Classification, CoplanarSet, RotationSet, classify};
pub use descriptor::{
    DescriptorCache, DrawCallDescriptor, Lighting, MaterialModifiers, SurfaceSettings,
    TypeParams, VisualType,
};
pub use draw_call::{DrawCall, DrawCallSummary};
pub use error::{BatchError, BatchResult};
pub use ids::*;
pub use primitive::{Primitive, PrimitiveTable, RootInput, SubRoot, VisualPart};
pub use zlayer::{ZLayer, ZLayerStore};
