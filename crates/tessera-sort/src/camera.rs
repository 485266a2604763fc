//! Camera description consumed by the sort runner.
//!
//! Right-handed, looking down `-Z` in view space. Depth is `-z_view`.
//!
//! # Example
//!
//! ```
//! use tessera_sort::camera::{CameraKind, CameraView};
//! use tessera_batch::CameraId;
//! use glam::Vec3;
//!
//! let mut camera = CameraView::perspective(CameraId(0), 60.0, 16.0 / 9.0, 0.1, 100.0);
//! camera.look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
//! assert!(camera.validate().is_ok());
//! assert_eq!(camera.kind, CameraKind::Game);
//! ```

use glam::{Mat4, Vec3};
use tessera_batch::CameraId;
use tessera_core::math::is_finite_mat4;

use crate::error::{SortError, SortResult};

/// Where the camera renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraKind {
    /// A regular in-game camera.
    #[default]
    Game,
    /// Editor or scene preview camera; sees every root.
    ScenePreview,
}

/// Projection mode for a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
    Perspective {
        fov_y_radians: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    },
}

/// Camera pose and projection for one sort pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraView {
    /// Key of this camera's output in the sort runner.
    pub id: CameraId,
    /// Game cameras respect screen-space targeting; scene previews see every root.
    pub kind: CameraKind,
    position: Vec3,
    target: Vec3,
    up: Vec3,
    projection: ProjectionMode,
}

impl CameraView {
    /// Orthographic camera centered on its view axis.
    pub fn orthographic(id: CameraId, width: f32, height: f32, near: f32, far: f32) -> Self {
        let half_width = width / 2.0;
        let half_height = height / 2.0;
        Self {
            id,
            kind: CameraKind::Game,
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: ProjectionMode::Orthographic {
                left: -half_width,
                right: half_width,
                bottom: -half_height,
                top: half_height,
                near,
                far,
            },
        }
    }

    /// Perspective camera with a vertical field of view in degrees.
    pub fn perspective(
        id: CameraId,
        fov_y_degrees: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            id,
            kind: CameraKind::Game,
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: ProjectionMode::Perspective {
                fov_y_radians: fov_y_degrees.to_radians(),
                aspect_ratio,
                near,
                far,
            },
        }
    }

    /// Builder-style setter for [`kind`](Self::kind).
    pub fn with_kind(mut self, kind: CameraKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the camera to look at a target from a position.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.position = eye;
        self.target = target;
        self.up = up;
    }

    /// Eye position in world space.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Point the camera looks at.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// World up hint passed to `look_at_rh`.
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Current projection mode.
    pub fn projection(&self) -> ProjectionMode {
        self.projection
    }

    /// Switch projection mode, keeping the pose.
    pub fn set_projection(&mut self, projection: ProjectionMode) {
        self.projection = projection;
    }

    /// Normalized vector from position to target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Whether depth is measured along the view axis.
    pub fn is_orthographic(&self) -> bool {
        matches!(self.projection, ProjectionMode::Orthographic { .. })
    }

    /// World to view space (right-handed, looking down -Z).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// View to clip space.
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            ProjectionMode::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh(left, right, bottom, top, near, far),
            ProjectionMode::Perspective {
                fov_y_radians,
                aspect_ratio,
                near,
                far,
            } => Mat4::perspective_rh(fov_y_radians, aspect_ratio, near, far),
        }
    }

    /// World to clip space.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Check that the pose and projection give usable matrices.
    pub fn validate(&self) -> SortResult<()> {
        let invalid = |reason| SortError::InvalidCamera {
            camera: self.id,
            reason,
        };

        if !(self.position.is_finite() && self.target.is_finite() && self.up.is_finite()) {
            return Err(invalid("non-finite pose"));
        }
        let forward = self.target - self.position;
        if forward.length_squared() <= f32::EPSILON {
            return Err(invalid("zero-length view direction"));
        }
        if forward.normalize().cross(self.up.normalize_or_zero()).length_squared() <= f32::EPSILON {
            return Err(invalid("up vector parallel to view direction"));
        }

        match self.projection {
            ProjectionMode::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => {
                if !(left < right && bottom < top && near < far) {
                    return Err(invalid("empty orthographic volume"));
                }
            }
            ProjectionMode::Perspective {
                fov_y_radians,
                aspect_ratio,
                near,
                far,
            } => {
                if !(fov_y_radians > 0.0 && fov_y_radians < std::f32::consts::PI) {
                    return Err(invalid("field of view out of range"));
                }
                if !(aspect_ratio > 0.0 && near > 0.0 && near < far) {
                    return Err(invalid("degenerate perspective frustum"));
                }
            }
        }

        if !is_finite_mat4(&self.view_projection_matrix()) {
            return Err(invalid("non-finite view-projection matrix"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orthographic_camera() {
        let mut camera = CameraView::orthographic(CameraId(0), 800.0, 600.0, 0.1, 100.0);
        camera.look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);

        assert!(camera.is_orthographic());
        assert!(camera.validate().is_ok());
        assert!(!camera.view_projection_matrix().is_nan());
    }

    #[test]
    fn test_perspective_camera() {
        let mut camera = CameraView::perspective(CameraId(0), 60.0, 16.0 / 9.0, 0.1, 100.0);
        camera.look_at(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO, Vec3::Y);

        assert!(!camera.is_orthographic());
        assert!(camera.validate().is_ok());
    }

    #[test]
    fn test_view_space_looks_down_negative_z() {
        let mut camera = CameraView::perspective(CameraId(0), 60.0, 1.0, 0.1, 100.0);
        camera.look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);

        let p = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((p.z + 10.0).abs() < 1e-5);
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_invalid_cameras() {
        let mut camera = CameraView::perspective(CameraId(1), 60.0, 1.0, 0.1, 100.0);
        camera.look_at(Vec3::ZERO, Vec3::ZERO, Vec3::Y);
        assert!(matches!(
            camera.validate(),
            Err(SortError::InvalidCamera { camera: CameraId(1), .. })
        ));

        camera.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Z);
        assert!(camera.validate().is_err());

        camera.look_at(Vec3::new(f32::NAN, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        assert!(camera.validate().is_err());

        let mut camera = CameraView::perspective(CameraId(1), 60.0, 1.0, 0.0, 100.0);
        camera.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        assert!(camera.validate().is_err());
    }
}
