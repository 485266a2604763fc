//! Scene fixtures.

use glam::Mat4;
use tessera_batch::{
    DrawCallDescriptor, Primitive, PrimitiveIndex, RootInput, SubRoot, SubRootIndex, VisualPart,
};
use tessera_core::Aabb;

/// Flat quad part in sub-root local space.
pub fn quad_part(
    descriptor: DrawCallDescriptor,
    render_type_index: u32,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> VisualPart {
    VisualPart::new(
        descriptor,
        render_type_index,
        Aabb::from_rect(x, y, width, height, 0.0),
    )
}

/// Builds a [`RootInput`] one primitive at a time, in traversal order.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    input: RootInput,
    next_order: u32,
    next_render_index: u32,
    detect_overlaps: bool,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::with_root_transform(Mat4::IDENTITY)
    }

    pub fn with_root_transform(world: Mat4) -> Self {
        Self {
            input: RootInput::with_root_transform(world),
            next_order: 0,
            next_render_index: 0,
            detect_overlaps: false,
        }
    }

    /// Fill every overlap list from intersecting world bounds on [`build`](Self::build).
    pub fn with_overlaps(mut self) -> Self {
        self.detect_overlaps = true;
        self
    }

    pub fn sub_root(&mut self, world: Mat4) -> SubRootIndex {
        let order = self.input.sub_roots.len() as u32;
        self.input.add_sub_root(SubRoot::new(world, order))
    }

    /// A plain 2D block on the batch root.
    pub fn quad(&mut self, x: f32, y: f32, width: f32, height: f32, z_index: i16) -> PrimitiveIndex {
        self.quad_on(
            SubRootIndex::ROOT,
            DrawCallDescriptor::block_2d(),
            x,
            y,
            width,
            height,
            z_index,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn quad_on(
        &mut self,
        sub_root: SubRootIndex,
        descriptor: DrawCallDescriptor,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        z_index: i16,
    ) -> PrimitiveIndex {
        let part = quad_part(descriptor, self.next_render_index, x, y, width, height);
        self.next_render_index += 1;
        self.primitive(Primitive::single(sub_root, 0, z_index, part))
    }

    /// Insert a fully specified primitive. Its traversal order is overwritten.
    pub fn primitive(&mut self, mut primitive: Primitive) -> PrimitiveIndex {
        primitive.traversal_order = self.next_order;
        self.next_order += 1;
        self.input.primitives.insert(primitive)
    }

    /// Declare that `primitive` overlaps `others`.
    pub fn overlaps(&mut self, primitive: PrimitiveIndex, others: &[PrimitiveIndex]) {
        let mut list = self.input.primitives.overlaps(primitive).to_vec();
        list.extend_from_slice(others);
        let _ = self.input.primitives.set_overlaps(primitive, list);
    }

    pub fn input(&self) -> &RootInput {
        &self.input
    }

    pub fn build(mut self) -> RootInput {
        if self.detect_overlaps {
            detect_overlaps(&mut self.input);
        }
        self.input
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// World bounds of every part of a primitive, unioned.
pub fn primitive_world_bounds(input: &RootInput, primitive: &Primitive) -> Aabb {
    let world = input
        .sub_root(primitive.sub_root)
        .map(|s| s.world)
        .unwrap_or(Mat4::IDENTITY);
    primitive
        .parts
        .iter()
        .fold(Aabb::EMPTY, |acc, part| acc.union(&part.local_bounds.transformed(&world)))
}

/// Replace every overlap list with the primitives whose world bounds intersect.
pub fn detect_overlaps(input: &mut RootInput) {
    let bounds: Vec<(PrimitiveIndex, Aabb)> = input
        .primitives
        .iter()
        .map(|(index, p)| (index, primitive_world_bounds(input, p)))
        .collect();
    for (index, own) in &bounds {
        let others: Vec<PrimitiveIndex> = bounds
            .iter()
            .filter(|(other, b)| other != index && b.intersects(own))
            .map(|(other, _)| *other)
            .collect();
        let _ = input.primitives.set_overlaps(*index, others);
    }
}

/// `columns x rows` quads of size `size` on a grid with spacing `pitch`.
///
/// A pitch smaller than the size makes neighbours overlap. Every fourth
/// quad uses a text descriptor so several draw-call keys interleave.
pub fn grid_scene(columns: u32, rows: u32, size: f32, pitch: f32) -> RootInput {
    let mut scene = SceneBuilder::new().with_overlaps();
    for row in 0..rows {
        for column in 0..columns {
            let i = row * columns + column;
            let descriptor = if i % 4 == 3 {
                DrawCallDescriptor::text(0)
            } else {
                DrawCallDescriptor::block_2d()
            };
            scene.quad_on(
                SubRootIndex::ROOT,
                descriptor,
                column as f32 * pitch,
                row as f32 * pitch,
                size,
                size,
                (i % 3) as i16,
            );
        }
    }
    scene.build()
}
