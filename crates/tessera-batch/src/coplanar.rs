//! Coplanar and rotation set classification.
//!
//! Sub-roots of a batch root are grouped into sets that share a rendering
//! plane (coplanar sets) or a world rotation (rotation sets). The batch root
//! always seeds set 0 of both kinds. Every other sub-root joins the first
//! existing set it matches within the configured tolerances, or seeds a new
//! one. First match wins; there is no best-match search and no iteration.

use glam::{Mat3, Mat4, Quat, Vec3};
use tessera_core::{Aabb, BatchingConfig};
use tessera_core::profiling::profile_function;

use crate::ids::{CoplanarSetId, RotationSetId, SubRootIndex};
use crate::primitive::SubRoot;

/// Content that lies in one plane of a reference transform.
#[derive(Debug, Clone, PartialEq)]
pub struct CoplanarSet {
    /// Position in [`Classification::coplanar_sets`].
    pub id: CoplanarSetId,
    /// Sub-root whose transform defines the set's local space.
    pub transform_root: SubRootIndex,
    /// Set space to world space. Set-space `z` is the distance along the plane normal.
    pub local_to_world: Mat4,
    /// Inverse of `local_to_world`.
    pub world_to_local: Mat4,
    /// Union of the set's flat element bounds, in set space.
    pub render_bounds: Aabb,
    /// Number of flat draw calls created in this set.
    pub transparent_draw_call_count: u32,
    /// Number of flat elements assigned to this set.
    pub transparent_element_count: u32,
}

impl CoplanarSet {
    fn seeded(
        id: CoplanarSetId,
        transform_root: SubRootIndex,
        plane: Option<&PlaneBasis>,
        world: &Mat4,
    ) -> Self {
        let local_to_world = match plane {
            Some(plane) => plane.local_to_world(),
            None => Mat4::from_translation(world.w_axis.truncate()),
        };
        Self {
            id,
            transform_root,
            local_to_world,
            world_to_local: local_to_world.inverse(),
            render_bounds: Aabb::EMPTY,
            transparent_draw_call_count: 0,
            transparent_element_count: 0,
        }
    }

    /// Whether any flat draw call was created in this set.
    pub fn has_transparent_content(&self) -> bool {
        self.transparent_draw_call_count > 0
    }
}

/// Sub-roots sharing one world rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationSet {
    /// Position in [`Classification::rotation_sets`].
    pub id: RotationSetId,
    /// World rotation of the sub-root that seeded the set.
    pub rotation: Quat,
}

/// A sub-root's XY plane in world space.
///
/// The set-space basis keeps the transform's X and Y axes and replaces its Z
/// axis with the unit plane normal. Set-space `z` is then the signed distance
/// from the plane, and the basis stays invertible when the transform scales Z
/// to zero or shears it.
#[derive(Debug, Clone, Copy)]
struct PlaneBasis {
    x: Vec3,
    y: Vec3,
    normal: Vec3,
    origin: Vec3,
}

impl PlaneBasis {
    fn from_world(world: &Mat4) -> Option<Self> {
        let x = world.transform_vector3(Vec3::X);
        let y = world.transform_vector3(Vec3::Y);
        let normal = x.cross(y).normalize_or_zero();
        let origin = world.transform_point3(Vec3::ZERO);
        if normal == Vec3::ZERO || !origin.is_finite() {
            return None;
        }
        Some(Self {
            x,
            y,
            normal,
            origin,
        })
    }

    fn local_to_world(&self) -> Mat4 {
        Mat4::from_cols(
            self.x.extend(0.0),
            self.y.extend(0.0),
            self.normal.extend(0.0),
            self.origin.extend(1.0),
        )
    }

    /// In-plane rotation, used when the transform itself has no rotation to extract.
    fn rotation(&self) -> Quat {
        let x = self.x.normalize_or_zero();
        Quat::from_mat3(&Mat3::from_cols(x, self.normal.cross(x), self.normal)).normalize()
    }

    fn matches(&self, other: &PlaneBasis, config: &BatchingConfig) -> bool {
        let parallel = 1.0 - self.normal.dot(other.normal).abs();
        if parallel > config.coplanar_normal_tolerance {
            return false;
        }
        (other.origin - self.origin).dot(self.normal).abs() <= config.coplanar_distance_tolerance
    }
}

/// Set assignment for every sub-root of one batch root.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Coplanar set of each sub-root, indexed by [`SubRootIndex`].
    pub coplanar_of: Vec<CoplanarSetId>,
    /// Rotation set of each sub-root, indexed by [`SubRootIndex`].
    pub rotation_of: Vec<RotationSetId>,
    /// Coplanar sets in creation order. Set 0 belongs to the batch root.
    pub coplanar_sets: Vec<CoplanarSet>,
    /// Rotation sets in creation order. Set 0 belongs to the batch root.
    pub rotation_sets: Vec<RotationSet>,
    /// Sub-root local space to coplanar set space, indexed by [`SubRootIndex`].
    to_set_space: Vec<Mat4>,
}

impl Classification {
    /// Coplanar set a sub-root was assigned to.
    pub fn coplanar_set_of(&self, sub_root: SubRootIndex) -> Option<CoplanarSetId> {
        self.coplanar_of.get(sub_root.index()).copied()
    }

    /// Rotation set a sub-root was assigned to.
    pub fn rotation_set_of(&self, sub_root: SubRootIndex) -> Option<RotationSetId> {
        self.rotation_of.get(sub_root.index()).copied()
    }

    pub fn coplanar_set(&self, id: CoplanarSetId) -> Option<&CoplanarSet> {
        self.coplanar_sets.get(id.index())
    }

    pub fn coplanar_set_mut(&mut self, id: CoplanarSetId) -> Option<&mut CoplanarSet> {
        self.coplanar_sets.get_mut(id.index())
    }

    /// Matrix taking `sub_root` local coordinates into its coplanar set's space.
    pub fn to_set_space(&self, sub_root: SubRootIndex) -> Option<&Mat4> {
        self.to_set_space.get(sub_root.index())
    }
}

fn rotation_of(world: &Mat4, plane: Option<&PlaneBasis>) -> Quat {
    let det = world.determinant();
    if det != 0.0 && det.is_finite() {
        let (_, rotation, _) = world.to_scale_rotation_translation();
        if rotation.is_finite() {
            return rotation.normalize();
        }
    }
    plane.map_or(Quat::IDENTITY, PlaneBasis::rotation)
}

/// Classify `sub_roots` (index 0 being the batch root) into coplanar and rotation sets.
pub fn classify(sub_roots: &[SubRoot], config: &BatchingConfig) -> Classification {
    profile_function!();

    let mut out = Classification::default();
    let Some(root) = sub_roots.first() else {
        return out;
    };

    let root_plane = PlaneBasis::from_world(&root.world);
    out.coplanar_sets.push(CoplanarSet::seeded(
        CoplanarSetId::ROOT,
        SubRootIndex::ROOT,
        root_plane.as_ref(),
        &root.world,
    ));
    out.rotation_sets.push(RotationSet {
        id: RotationSetId(0),
        rotation: rotation_of(&root.world, root_plane.as_ref()),
    });
    let mut planes: Vec<Option<PlaneBasis>> = vec![root_plane];

    for (index, sub_root) in sub_roots.iter().enumerate() {
        let sub_index = SubRootIndex::from(index);
        if index == 0 {
            out.coplanar_of.push(CoplanarSetId::ROOT);
            out.rotation_of.push(RotationSetId(0));
            continue;
        }

        let plane = PlaneBasis::from_world(&sub_root.world);
        let coplanar = plane
            .as_ref()
            .and_then(|plane| {
                planes.iter().position(|candidate| {
                    candidate
                        .as_ref()
                        .is_some_and(|candidate| candidate.matches(plane, config))
                })
            })
            .map(CoplanarSetId::from)
            .unwrap_or_else(|| {
                let id = CoplanarSetId::from(out.coplanar_sets.len());
                out.coplanar_sets.push(CoplanarSet::seeded(
                    id,
                    sub_index,
                    plane.as_ref(),
                    &sub_root.world,
                ));
                planes.push(plane);
                id
            });
        out.coplanar_of.push(coplanar);

        let rotation = rotation_of(&sub_root.world, plane.as_ref());
        let rotation_set = out
            .rotation_sets
            .iter()
            .find(|set| 1.0 - set.rotation.dot(rotation).abs() <= config.rotation_tolerance)
            .map(|set| set.id)
            .unwrap_or_else(|| {
                let id = RotationSetId::from(out.rotation_sets.len());
                out.rotation_sets.push(RotationSet { id, rotation });
                id
            });
        out.rotation_of.push(rotation_set);
    }

    out.to_set_space = sub_roots
        .iter()
        .zip(&out.coplanar_of)
        .map(|(sub_root, set)| out.coplanar_sets[set.index()].world_to_local * sub_root.world)
        .collect();

    tracing::trace!(
        sub_roots = sub_roots.len(),
        coplanar_sets = out.coplanar_sets.len(),
        rotation_sets = out.rotation_sets.len(),
        "Classified sub-roots"
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use std::f32::consts::FRAC_PI_2;

    fn sub(world: Mat4, order: u32) -> SubRoot {
        SubRoot::new(world, order)
    }

    #[test]
    fn test_root_is_its_own_set() {
        let c = classify(&[sub(Mat4::IDENTITY, 0)], &BatchingConfig::default());
        assert_eq!(c.coplanar_of, vec![CoplanarSetId::ROOT]);
        assert_eq!(c.coplanar_sets.len(), 1);
        assert_eq!(c.rotation_sets.len(), 1);
    }

    #[test]
    fn test_in_plane_translation_is_coplanar() {
        let subs = [
            sub(Mat4::IDENTITY, 0),
            sub(Mat4::from_translation(Vec3::new(50.0, -20.0, 0.0)), 1),
            sub(
                Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0))
                    * Mat4::from_rotation_z(0.3),
                2,
            ),
        ];
        let c = classify(&subs, &BatchingConfig::default());
        assert_eq!(c.coplanar_of, vec![CoplanarSetId(0); 3]);
        // The in-plane rotation still splits rotation sets.
        assert_eq!(c.rotation_of[1], RotationSetId(0));
        assert_eq!(c.rotation_of[2], RotationSetId(1));
    }

    #[test]
    fn test_depth_offset_creates_new_set() {
        let subs = [
            sub(Mat4::IDENTITY, 0),
            sub(Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)), 1),
            sub(Mat4::from_translation(Vec3::new(9.0, 3.0, 2.0)), 2),
        ];
        let c = classify(&subs, &BatchingConfig::default());
        assert_eq!(
            c.coplanar_of,
            vec![CoplanarSetId(0), CoplanarSetId(1), CoplanarSetId(1)]
        );
        assert_eq!(c.coplanar_sets[1].transform_root, SubRootIndex(1));
    }

    #[test]
    fn test_tilted_plane_is_separate() {
        let subs = [
            sub(Mat4::IDENTITY, 0),
            sub(Mat4::from_rotation_y(FRAC_PI_2), 1),
        ];
        let c = classify(&subs, &BatchingConfig::default());
        assert_eq!(c.coplanar_sets.len(), 2);
        assert_eq!(c.rotation_sets.len(), 2);
    }

    #[test]
    fn test_to_set_space_maps_into_reference() {
        let offset = Mat4::from_translation(Vec3::new(0.0, 0.0, 4.0));
        let subs = [
            sub(Mat4::IDENTITY, 0),
            sub(offset, 1),
            sub(offset * Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)), 2),
        ];
        let c = classify(&subs, &BatchingConfig::default());
        let m = c.to_set_space(SubRootIndex(2)).expect("classified");
        let p = m.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let subs: Vec<_> = (0..12)
            .map(|i| {
                sub(
                    Mat4::from_translation(Vec3::new(i as f32, 0.0, (i % 3) as f32)),
                    i,
                )
            })
            .collect();
        let config = BatchingConfig::default();
        let a = classify(&subs, &config);
        let b = classify(&subs, &config);
        assert_eq!(a.coplanar_of, b.coplanar_of);
        assert_eq!(a.rotation_of, b.rotation_of);
    }

    #[test]
    fn test_zero_depth_scale_keeps_invertible_set_space() {
        let flat = Mat4::from_scale(Vec3::new(1.0, 1.0, 0.0));
        let subs = [sub(flat, 0), sub(flat * Mat4::from_translation(Vec3::X * 4.0), 1)];
        let c = classify(&subs, &BatchingConfig::default());

        assert_eq!(c.coplanar_of, vec![CoplanarSetId(0); 2]);
        assert_eq!(c.rotation_of, vec![RotationSetId(0); 2]);
        let set = &c.coplanar_sets[0];
        assert!(set.world_to_local.is_finite());
        let m = c.to_set_space(SubRootIndex(1)).expect("classified");
        let p = m.transform_point3(Vec3::new(1.0, 2.0, 3.0));
        assert!((p - Vec3::new(5.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_sheared_depth_axis_stays_coplanar() {
        let sheared = Mat4::from_cols(
            Vec4::X,
            Vec4::Y,
            Vec4::new(1.0, 0.0, 1.0, 0.0),
            Vec4::new(7.0, 0.0, 0.0, 1.0),
        );
        let subs = [sub(Mat4::IDENTITY, 0), sub(sheared, 1)];
        let c = classify(&subs, &BatchingConfig::default());
        assert_eq!(c.coplanar_of, vec![CoplanarSetId(0); 2]);
        assert_eq!(c.coplanar_sets.len(), 1);
    }

    #[test]
    fn test_set_space_depth_is_plane_distance() {
        let scaled = Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0))
            * Mat4::from_scale(Vec3::new(3.0, 3.0, 5.0));
        let c = classify(&[sub(scaled, 0)], &BatchingConfig::default());
        let set = &c.coplanar_sets[0];
        let p = set.world_to_local.transform_point3(Vec3::new(0.0, 0.0, 6.0));
        assert!((p.z - 4.0).abs() < 1e-5);
    }
}
