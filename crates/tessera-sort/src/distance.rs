//! Camera distances of a view-space quad.
//!
//! Orthographic cameras measure depth along the view axis. Perspective
//! cameras measure Euclidean distance from the eye, with the minimum taken
//! at the closest point of the quad rather than the closest corner.

use glam::Vec3;

/// Distances from the camera to a coplanar set's quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetDistances {
    /// Closest point of the quad.
    pub min: f32,
    /// Farthest corner of the quad.
    pub max: f32,
    /// Center of the quad. Seeds the resolved distance.
    pub center: f32,
}

impl SetDistances {
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.center.is_finite()
    }
}

/// Depths along the view axis of a view-space quad.
pub fn orthographic_distances(quad: &[Vec3; 4], center: Vec3) -> SetDistances {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for corner in quad {
        min = min.min(-corner.z);
        max = max.max(-corner.z);
    }
    SetDistances {
        min,
        max,
        center: -center.z,
    }
}

/// Eye distances of a view-space quad.
pub fn perspective_distances(quad: &[Vec3; 4], center: Vec3) -> SetDistances {
    let max = quad
        .iter()
        .map(|corner| corner.length())
        .fold(f32::NEG_INFINITY, f32::max);
    SetDistances {
        min: closest_point_on_quad(quad, Vec3::ZERO).length(),
        max,
        center: center.length(),
    }
}

/// Point of segment `ab` closest to `point`.
pub fn closest_point_on_segment(a: Vec3, b: Vec3, point: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest point of a convex planar quad to `point`.
///
/// Uses the projection onto the quad's plane when it falls inside, otherwise
/// the closest point over the four edges. Degenerate quads use edges only.
pub fn closest_point_on_quad(quad: &[Vec3; 4], point: Vec3) -> Vec3 {
    let normal = (quad[1] - quad[0]).cross(quad[3] - quad[0]);
    if normal.length_squared() > f32::EPSILON {
        let n = normal.normalize();
        let projected = point - n * n.dot(point - quad[0]);
        if inside_convex_quad(quad, n, projected) {
            return projected;
        }
    }

    let mut best = quad[0];
    let mut best_dist = f32::INFINITY;
    for i in 0..4 {
        let candidate = closest_point_on_segment(quad[i], quad[(i + 1) % 4], point);
        let dist = candidate.distance_squared(point);
        if dist < best_dist {
            best = candidate;
            best_dist = dist;
        }
    }
    best
}

/// Whether `point`, lying in the quad's plane, is inside or on the quad.
pub(crate) fn inside_convex_quad(quad: &[Vec3; 4], normal: Vec3, point: Vec3) -> bool {
    const TOLERANCE: f32 = 1e-5;

    let mut positive = false;
    let mut negative = false;
    for i in 0..4 {
        let edge = quad[(i + 1) % 4] - quad[i];
        let to_point = point - quad[i];
        let scale = edge.length() * to_point.length();
        if scale <= f32::EPSILON {
            continue;
        }
        let side = edge.cross(to_point).dot(normal) / scale;
        if side > TOLERANCE {
            positive = true;
        } else if side < -TOLERANCE {
            negative = true;
        }
    }
    !(positive && negative)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(z: f32) -> [Vec3; 4] {
        [
            Vec3::new(-1.0, -1.0, z),
            Vec3::new(1.0, -1.0, z),
            Vec3::new(1.0, 1.0, z),
            Vec3::new(-1.0, 1.0, z),
        ]
    }

    #[test]
    fn test_orthographic_uses_depth() {
        let d = orthographic_distances(&square(-5.0), Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(d, SetDistances { min: 5.0, max: 5.0, center: 5.0 });
    }

    #[test]
    fn test_perspective_interior_projection() {
        let d = perspective_distances(&square(-5.0), Vec3::new(0.0, 0.0, -5.0));
        assert!((d.min - 5.0).abs() < 1e-5);
        assert!((d.max - 27.0f32.sqrt()).abs() < 1e-5);
        assert!((d.center - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_perspective_edge_case() {
        // Quad off to the side; the closest point is on its left edge.
        let quad = square(-4.0).map(|c| c + Vec3::new(4.0, 0.0, 0.0));
        let closest = closest_point_on_quad(&quad, Vec3::ZERO);
        assert!((closest - Vec3::new(3.0, 0.0, -4.0)).length() < 1e-5);
    }

    #[test]
    fn test_perspective_vertex_case() {
        let quad = square(-2.0).map(|c| c + Vec3::new(5.0, 5.0, 0.0));
        let closest = closest_point_on_quad(&quad, Vec3::ZERO);
        assert!((closest - Vec3::new(4.0, 4.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn test_inside_convex_quad() {
        let quad = square(0.0);
        assert!(inside_convex_quad(&quad, Vec3::Z, Vec3::new(0.5, 0.5, 0.0)));
        assert!(inside_convex_quad(&quad, Vec3::Z, Vec3::new(1.0, 0.0, 0.0)));
        assert!(!inside_convex_quad(&quad, Vec3::Z, Vec3::new(1.5, 0.0, 0.0)));
    }
}
