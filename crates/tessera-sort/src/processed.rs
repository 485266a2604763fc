//! Per-draw-call sort results handed to the renderer.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;
use tessera_core::Aabb;

/// Camera-specific bounds of one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessedDrawCall {
    /// World-space bounds, nudged toward the camera for flat content.
    pub adjusted_bounds: Aabb,
    /// Whether the camera sees the back face of the draw call's set.
    pub viewing_from_behind: bool,
    /// `false` when the bounds could not be computed.
    pub render: bool,
}

impl ProcessedDrawCall {
    /// Output for a draw call that renders.
    pub fn new(adjusted_bounds: Aabb, viewing_from_behind: bool) -> Self {
        Self {
            adjusted_bounds,
            viewing_from_behind,
            render: true,
        }
    }

    /// Output for a draw call whose bounds are unusable.
    pub fn hidden(bounds: Aabb) -> Self {
        Self {
            adjusted_bounds: bounds,
            viewing_from_behind: false,
            render: false,
        }
    }

    /// Pack for upload as a [`DrawCallUniform`].
    pub fn to_uniform(&self) -> DrawCallUniform {
        DrawCallUniform {
            center: self.adjusted_bounds.center().to_array(),
            viewing_from_behind: u32::from(self.viewing_from_behind),
            extents: self.adjusted_bounds.extents().to_array(),
            render: u32::from(self.render),
        }
    }
}

/// GPU layout of [`ProcessedDrawCall`].
///
/// ```wgsl
/// struct DrawCallUniform {
///     center: vec3<f32>,
///     viewing_from_behind: u32,
///     extents: vec3<f32>,
///     render: u32,
/// }
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawCallUniform {
    /// Center of the adjusted bounds.
    pub center: [f32; 3],
    /// `1` when seen from behind, else `0`.
    pub viewing_from_behind: u32,
    /// Half-size of the adjusted bounds.
    pub extents: [f32; 3],
    /// `1` when the draw call should be submitted, else `0`.
    pub render: u32,
}

const_assert_eq!(std::mem::size_of::<DrawCallUniform>(), 32);
const_assert_eq!(std::mem::align_of::<DrawCallUniform>(), 4);

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_uniform_packing() {
        let processed = ProcessedDrawCall {
            adjusted_bounds: Aabb::from_center_extents(Vec3::new(1.0, 2.0, 3.0), Vec3::splat(0.5)),
            viewing_from_behind: true,
            render: true,
        };
        let uniform = processed.to_uniform();
        assert_eq!(uniform.center, [1.0, 2.0, 3.0]);
        assert_eq!(uniform.extents, [0.5, 0.5, 0.5]);
        assert_eq!(uniform.viewing_from_behind, 1);
        assert_eq!(uniform.render, 1);

        let bytes: &[u8] = bytemuck::bytes_of(&uniform);
        assert_eq!(bytes.len(), 32);
    }

    #[test]
    fn test_hidden_does_not_render() {
        let hidden = ProcessedDrawCall::hidden(Aabb::EMPTY);
        assert!(!hidden.render);
        assert_eq!(hidden.to_uniform().render, 0);
    }
}
