//! Quad-vs-quad "which one is in front" test in view space.
//!
//! Corners of one quad are cast along camera rays onto the other quad's
//! plane. Where the hits land inside the other quad, the two quads cover the
//! same pixels there and the hit distances say which is closer. When no
//! corner lands inside either quad, the quads' diagonals are intersected on
//! screen and the ray through the crossing decides.

use glam::{Vec2, Vec3};
use tessera_core::math::approx_eq;

use crate::distance::inside_convex_quad;

/// `normal . p == d`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    /// Plane through a quad's corners, `None` when the quad has no area.
    pub fn from_quad(quad: &[Vec3; 4]) -> Option<Plane> {
        let normal = (quad[1] - quad[0]).cross(quad[3] - quad[0]);
        if normal.length_squared() <= f32::EPSILON * f32::EPSILON || !normal.is_finite() {
            return None;
        }
        let normal = normal.normalize();
        Some(Plane {
            normal,
            d: normal.dot(quad[0]),
        })
    }

    /// Positive on the side the normal points to.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.d
    }
}

/// A coplanar set's render bounds as a view-space quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewQuad {
    /// Corners in winding order.
    pub corners: [Vec3; 4],
    /// `None` for a degenerate quad, which never contains a point.
    pub plane: Option<Plane>,
}

impl ViewQuad {
    pub fn new(corners: [Vec3; 4]) -> Self {
        Self {
            corners,
            plane: Plane::from_quad(&corners),
        }
    }

    /// Whether `point`, assumed to lie on the quad's plane, is inside the quad.
    pub fn contains(&self, point: Vec3) -> bool {
        self.plane
            .is_some_and(|plane| inside_convex_quad(&self.corners, plane.normal, point))
    }
}

/// Outcome of [`compare_quads`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadOrder {
    /// The quads do not cover the same pixels.
    Disjoint,
    FirstOver,
    SecondOver,
    /// The quads overlap but neither is in front; needs a tie-break.
    Coplanar,
}

#[derive(Debug, Clone, Copy)]
struct Ray {
    origin: Vec3,
    dir: Vec3,
}

impl Ray {
    /// Ray from the camera through a view-space point, and the point's distance along it.
    fn through(point: Vec3, orthographic: bool) -> Option<(Ray, f32)> {
        if orthographic {
            let ray = Ray {
                origin: Vec3::new(point.x, point.y, 0.0),
                dir: Vec3::NEG_Z,
            };
            return Some((ray, -point.z));
        }
        let len = point.length();
        if len <= f32::EPSILON {
            return None;
        }
        let ray = Ray {
            origin: Vec3::ZERO,
            dir: point / len,
        };
        Some((ray, len))
    }

    /// Ray through a screen-space point (see [`to_screen`]).
    fn through_screen(point: Vec2, orthographic: bool) -> Ray {
        if orthographic {
            Ray {
                origin: point.extend(0.0),
                dir: Vec3::NEG_Z,
            }
        } else {
            Ray {
                origin: Vec3::ZERO,
                dir: Vec3::new(point.x, point.y, -1.0).normalize(),
            }
        }
    }

    fn hit(&self, plane: &Plane) -> Option<f32> {
        let denom = plane.normal.dot(self.dir);
        if denom.abs() <= 1e-8 {
            return None;
        }
        let t = (plane.d - plane.normal.dot(self.origin)) / denom;
        (t > 0.0 && t.is_finite()).then_some(t)
    }
}

/// Screen position of a view-space point, before the projection matrix.
fn to_screen(point: Vec3, orthographic: bool) -> Option<Vec2> {
    if orthographic {
        return Some(point.truncate());
    }
    let depth = -point.z;
    (depth > f32::EPSILON).then(|| Vec2::new(point.x, point.y) / depth)
}

/// Per corner of `from`: its own distance and the distance of its hit on
/// `onto`, if the hit lands inside `onto`.
fn project_corners(
    from: &ViewQuad,
    onto: &ViewQuad,
    orthographic: bool,
) -> [Option<(f32, f32)>; 4] {
    let Some(plane) = onto.plane else {
        return [None; 4];
    };
    from.corners.map(|corner| {
        let (ray, own) = Ray::through(corner, orthographic)?;
        let t = ray.hit(&plane)?;
        onto.contains(ray.origin + ray.dir * t).then_some((own, t))
    })
}

fn segment_intersection(p0: Vec2, p1: Vec2, q0: Vec2, q1: Vec2) -> Option<Vec2> {
    let r = p1 - p0;
    let s = q1 - q0;
    let denom = r.perp_dot(s);
    if denom.abs() <= f32::EPSILON {
        return None;
    }
    let qp = q0 - p0;
    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;
    ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then(|| p0 + r * t)
}

fn decide(first: f32, second: f32, epsilon: f32) -> QuadOrder {
    if approx_eq(first, second, epsilon) {
        QuadOrder::Coplanar
    } else if first < second {
        QuadOrder::FirstOver
    } else {
        QuadOrder::SecondOver
    }
}

/// Decide which of two view-space quads renders over the other.
pub fn compare_quads(a: &ViewQuad, b: &ViewQuad, orthographic: bool, epsilon: f32) -> QuadOrder {
    let (Some(plane_a), Some(plane_b)) = (a.plane, b.plane) else {
        return QuadOrder::Disjoint;
    };
    let coplanar = a
        .corners
        .iter()
        .all(|c| plane_b.signed_distance(*c).abs() <= epsilon * c.length().max(1.0));
    let settle = |first: f32, second: f32| {
        if coplanar {
            QuadOrder::Coplanar
        } else {
            decide(first, second, epsilon)
        }
    };

    let a_on_b = project_corners(a, b, orthographic);
    let b_on_a = project_corners(b, a, orthographic);

    if a_on_b.iter().all(Option::is_some) {
        let (sum_a, sum_b) = a_on_b
            .iter()
            .flatten()
            .fold((0.0f32, 0.0f32), |(sa, sb), (own, hit)| (sa + own, sb + hit));
        return settle(sum_a, sum_b);
    }
    if b_on_a.iter().all(Option::is_some) {
        let (sum_a, sum_b) = b_on_a
            .iter()
            .flatten()
            .fold((0.0f32, 0.0f32), |(sa, sb), (own, hit)| (sa + hit, sb + own));
        return settle(sum_a, sum_b);
    }

    if a_on_b.iter().chain(&b_on_a).any(Option::is_some) {
        let mut sq_a = 0.0f32;
        let mut sq_b = 0.0f32;
        for (own, hit) in a_on_b.iter().flatten() {
            sq_a += own * own;
            sq_b += hit * hit;
        }
        for (own, hit) in b_on_a.iter().flatten() {
            sq_a += hit * hit;
            sq_b += own * own;
        }
        return settle(sq_a, sq_b);
    }

    let screen = |quad: &ViewQuad| -> Option<[Vec2; 4]> {
        let mut out = [Vec2::ZERO; 4];
        for (slot, corner) in out.iter_mut().zip(&quad.corners) {
            *slot = to_screen(*corner, orthographic)?;
        }
        Some(out)
    };
    let (Some(sa), Some(sb)) = (screen(a), screen(b)) else {
        return QuadOrder::Disjoint;
    };
    for (a0, a1) in [(sa[0], sa[2]), (sa[1], sa[3])] {
        for (b0, b1) in [(sb[0], sb[2]), (sb[1], sb[3])] {
            let Some(crossing) = segment_intersection(a0, a1, b0, b1) else {
                continue;
            };
            let ray = Ray::through_screen(crossing, orthographic);
            if let (Some(ta), Some(tb)) = (ray.hit(&plane_a), ray.hit(&plane_b)) {
                return settle(ta, tb);
            }
        }
    }

    QuadOrder::Disjoint
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32, z: f32) -> ViewQuad {
        ViewQuad::new([
            Vec3::new(x0, y0, z),
            Vec3::new(x1, y0, z),
            Vec3::new(x1, y1, z),
            Vec3::new(x0, y1, z),
        ])
    }

    #[test]
    fn test_contained_quad_in_front() {
        let near = rect(-1.0, -1.0, 1.0, 1.0, -5.0);
        let far = rect(-4.0, -4.0, 4.0, 4.0, -10.0);
        assert_eq!(compare_quads(&near, &far, false, 1e-4), QuadOrder::FirstOver);
        assert_eq!(compare_quads(&far, &near, false, 1e-4), QuadOrder::SecondOver);
        assert_eq!(compare_quads(&near, &far, true, 1e-4), QuadOrder::FirstOver);
    }

    #[test]
    fn test_partial_overlap() {
        let a = rect(0.0, 0.0, 2.0, 2.0, -5.0);
        let b = rect(1.0, 1.0, 3.0, 3.0, -6.0);
        assert_eq!(compare_quads(&a, &b, true, 1e-4), QuadOrder::FirstOver);
        assert_eq!(compare_quads(&b, &a, true, 1e-4), QuadOrder::SecondOver);
    }

    #[test]
    fn test_cross_shape_uses_diagonals() {
        let wide = rect(-3.0, -0.5, 3.0, 0.5, -8.0);
        let tall = rect(-0.5, -3.0, 0.5, 3.0, -4.0);
        assert_eq!(compare_quads(&wide, &tall, true, 1e-4), QuadOrder::SecondOver);
    }

    #[test]
    fn test_disjoint() {
        let a = rect(0.0, 0.0, 1.0, 1.0, -5.0);
        let b = rect(5.0, 5.0, 6.0, 6.0, -5.0);
        assert_eq!(compare_quads(&a, &b, true, 1e-4), QuadOrder::Disjoint);
    }

    #[test]
    fn test_exactly_coplanar() {
        let a = rect(0.0, 0.0, 2.0, 2.0, -5.0);
        let b = rect(1.0, 0.0, 3.0, 2.0, -5.0);
        assert_eq!(compare_quads(&a, &b, false, 1e-4), QuadOrder::Coplanar);
    }

    #[test]
    fn test_degenerate_quad_has_no_plane() {
        let line = rect(0.0, 0.0, 1.0, 0.0, -5.0);
        assert!(line.plane.is_none());
        assert_eq!(
            compare_quads(&line, &rect(0.0, 0.0, 1.0, 1.0, -5.0), true, 1e-4),
            QuadOrder::Disjoint
        );
    }
}
