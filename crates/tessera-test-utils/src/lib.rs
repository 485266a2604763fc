//! Test utilities for tessera.
//!
//! Fixtures shared by the integration tests and benchmarks of the tessera
//! crates:
//!
//! - [`SceneBuilder`] - builds a [`RootInput`](tessera_batch::RootInput)
//!   from quads, with optional overlap detection by world bounds
//! - [`SortFixture`] - owned batch roots lent to the camera sort
//! - camera helpers - perspective and orthographic cameras looking at the
//!   origin from `+Z`
//!
//! # Example
//!
//! ```rust
//! use tessera_test_utils::SceneBuilder;
//!
//! let mut scene = SceneBuilder::new();
//! scene.quad(0.0, 0.0, 10.0, 10.0, 0);
//! scene.quad(5.0, 5.0, 10.0, 10.0, 1);
//! let input = scene.with_overlaps().build();
//! assert_eq!(input.primitives.len(), 2);
//! ```

pub mod cameras;
pub mod roots;
pub mod scene;

pub use cameras::*;
pub use roots::*;
pub use scene::*;
