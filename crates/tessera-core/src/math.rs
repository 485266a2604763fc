//! Math re-exports and small numeric helpers.
//!
//! All CPU-side math goes through [`glam`]. Helpers here cover the few
//! tolerance checks the classifier and camera sort share.
//!
//! [`glam`]: https://docs.rs/glam

pub use glam::*;

/// Whether every component of `v` is finite.
#[inline]
pub fn is_finite3(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

/// Whether every element of `m` is finite.
pub fn is_finite_mat4(m: &Mat4) -> bool {
    m.to_cols_array().iter().all(|c| c.is_finite())
}

/// Relative float comparison, scaled by the larger magnitude (at least 1).
#[inline]
pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon * a.abs().max(b.abs()).max(1.0)
}
