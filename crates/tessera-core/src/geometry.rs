//! Bounding volumes shared by arbitration and camera sorting.
//!
//! - [`Aabb`]: 3D axis-aligned box, used for element, draw-call and
//!   coplanar-set bounds
//! - [`Rect2`]: 2D rectangle, used for NDC-space overlap rejection

use crate::math::{Mat4, Vec2, Vec3, is_finite3};

/// Axis-Aligned Bounding Box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// The empty box. Encapsulating anything into it yields that thing.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    /// Create from min/max points.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create from a center and half-size.
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Flat rectangle in the XY plane at depth `z`.
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32, z: f32) -> Self {
        Self {
            min: Vec3::new(x, y, z),
            max: Vec3::new(x + width, y + height, z),
        }
    }

    /// Check if the box is empty/invalid.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Whether both corners are finite. Poisoned boxes are not.
    pub fn is_finite(&self) -> bool {
        is_finite3(self.min) && is_finite3(self.max)
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half the size along each axis.
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Grow to include `other`.
    pub fn encapsulate(&mut self, other: &Aabb) {
        if other.is_empty() {
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Grow to include `point`.
    pub fn encapsulate_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Union of two boxes.
    pub fn union(&self, other: &Aabb) -> Aabb {
        let mut out = *self;
        out.encapsulate(other);
        out
    }

    /// Check if this box intersects another (touching counts).
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, b.y, b.z),
            Vec3::new(a.x, b.y, b.z),
        ]
    }

    /// Axis-aligned box enclosing this box after transformation by `m`.
    ///
    /// A non-finite corner makes the whole result NaN, so callers only need
    /// [`is_finite`](Self::is_finite) to reject it.
    pub fn transformed(&self, m: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let mut out = Aabb::EMPTY;
        for corner in self.corners() {
            let point = m.transform_point3(corner);
            if !is_finite3(point) {
                return Aabb::from_min_max(Vec3::NAN, Vec3::NAN);
            }
            out.encapsulate_point(point);
        }
        out
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// 2D rectangle, used for normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect2 {
    /// Lower-left corner.
    pub min: Vec2,
    /// Upper-right corner.
    pub max: Vec2,
}

impl Rect2 {
    /// Inverted rectangle that any point grows into a valid one.
    pub const EMPTY: Rect2 = Rect2 {
        min: Vec2::splat(f32::MAX),
        max: Vec2::splat(f32::MIN),
    };

    /// The whole clip-space viewport.
    pub const NDC_FULL: Rect2 = Rect2 {
        min: Vec2::splat(-1.0),
        max: Vec2::splat(1.0),
    };

    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Grow to include `point`.
    pub fn encapsulate_point(&mut self, point: Vec2) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Check if this rectangle intersects another (touching does not count).
    pub fn intersects(&self, other: &Rect2) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

impl Default for Rect2 {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_encapsulate() {
        let mut b = Aabb::EMPTY;
        assert!(b.is_empty());
        b.encapsulate(&Aabb::from_rect(0.0, 0.0, 10.0, 5.0, 0.0));
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::new(10.0, 5.0, 0.0));
        assert!(!b.is_empty());
    }

    #[test]
    fn test_encapsulate_ignores_empty() {
        let mut b = Aabb::from_rect(0.0, 0.0, 1.0, 1.0, 0.0);
        b.encapsulate(&Aabb::EMPTY);
        assert_eq!(b, Aabb::from_rect(0.0, 0.0, 1.0, 1.0, 0.0));
    }

    #[test]
    fn test_center_extents_roundtrip() {
        let b = Aabb::from_min_max(Vec3::new(-1.0, 2.0, 0.0), Vec3::new(3.0, 4.0, 2.0));
        let c = Aabb::from_center_extents(b.center(), b.extents());
        assert_eq!(b, c);
    }

    #[test]
    fn test_transformed_rotation() {
        let b = Aabb::from_rect(0.0, 0.0, 2.0, 1.0, 0.0);
        let m = Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let t = b.transformed(&m);
        assert!((t.min.x - -1.0).abs() < 1e-5);
        assert!((t.max.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_transformed_poisons_non_finite() {
        let b = Aabb::from_rect(f32::NAN, 0.0, 1.0, 1.0, 0.0);
        assert!(!b.transformed(&Mat4::IDENTITY).is_finite());
        let scale = Mat4::from_scale(Vec3::splat(f32::INFINITY));
        assert!(!Aabb::from_rect(1.0, 1.0, 1.0, 1.0, 1.0).transformed(&scale).is_finite());
    }

    #[test]
    fn test_rect2_touching_does_not_intersect() {
        let a = Rect2::from_min_max(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Rect2::from_min_max(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        let c = Rect2::from_min_max(Vec2::new(0.5, 0.5), Vec2::new(2.0, 1.0));
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
    }
}
