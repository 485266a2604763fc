//! Camera fixtures.

use glam::Vec3;
use tessera_batch::CameraId;
use tessera_sort::{CameraKind, CameraView};

/// 60 degree perspective camera at `eye`, looking at the origin.
pub fn perspective_camera(id: u32, eye: Vec3) -> CameraView {
    let mut camera = CameraView::perspective(CameraId(id), 60.0, 1.0, 0.1, 1000.0);
    camera.look_at(eye, Vec3::ZERO, Vec3::Y);
    camera
}

/// Orthographic camera at `eye`, looking at the origin.
pub fn orthographic_camera(id: u32, eye: Vec3) -> CameraView {
    let mut camera = CameraView::orthographic(CameraId(id), 200.0, 200.0, 0.1, 1000.0);
    camera.look_at(eye, Vec3::ZERO, Vec3::Y);
    camera
}

/// Camera in front of the `z = 0` plane.
pub fn front_camera(id: u32) -> CameraView {
    perspective_camera(id, Vec3::new(0.0, 0.0, 50.0))
}

/// Camera behind the `z = 0` plane.
pub fn back_camera(id: u32) -> CameraView {
    perspective_camera(id, Vec3::new(0.0, 0.0, -50.0))
}

pub fn scene_preview_camera(id: u32) -> CameraView {
    front_camera(id).with_kind(CameraKind::ScenePreview)
}
