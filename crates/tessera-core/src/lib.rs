//! Tessera Core
//!
//! Shared building blocks for the tessera batching core: pooled storage,
//! geometry, configuration, logging and profiling.

pub mod alloc;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;

pub use config::BatchingConfig;
pub use geometry::{Aabb, Rect2};
