//! Multi-root fixtures for camera sort tests.

use glam::Mat4;
use tessera_batch::{BatchRootId, DrawCallDescriptor, RootBatch, SubRootIndex, build_root_batch};
use tessera_core::BatchingConfig;
use tessera_core::alloc::IndexSlot;
use tessera_sort::{RootSortInfo, SortableRoot};

use crate::scene::SceneBuilder;

pub fn root_id(index: u32) -> BatchRootId {
    BatchRootId::from_slot(IndexSlot::new(0, index))
}

/// A root whose only content is one flat quad, placed by `world`.
pub fn quad_batch(world: Mat4, x: f32, y: f32, width: f32, height: f32) -> RootBatch {
    let mut scene = SceneBuilder::with_root_transform(world);
    scene.quad_on(
        SubRootIndex::ROOT,
        DrawCallDescriptor::block_2d(),
        x,
        y,
        width,
        height,
        0,
    );
    build_root_batch(&scene.build(), &BatchingConfig::default())
}

/// Owned batches and sort infos, lent out as [`SortableRoot`]s.
#[derive(Debug, Default)]
pub struct SortFixture {
    ids: Vec<BatchRootId>,
    batches: Vec<RootBatch>,
    infos: Vec<RootSortInfo>,
}

impl SortFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, batch: RootBatch, info: RootSortInfo) -> BatchRootId {
        let id = root_id(self.ids.len() as u32);
        self.ids.push(id);
        self.batches.push(batch);
        self.infos.push(info);
        id
    }

    /// Add a single-quad root with default sort info.
    pub fn add_quad(&mut self, world: Mat4, x: f32, y: f32, width: f32, height: f32) -> BatchRootId {
        self.add(quad_batch(world, x, y, width, height), RootSortInfo::default())
    }

    pub fn info_mut(&mut self, id: BatchRootId) -> Option<&mut RootSortInfo> {
        let index = self.ids.iter().position(|&other| other == id)?;
        self.infos.get_mut(index)
    }

    pub fn batch(&self, id: BatchRootId) -> Option<&RootBatch> {
        let index = self.ids.iter().position(|&other| other == id)?;
        self.batches.get(index)
    }

    pub fn roots(&self) -> Vec<SortableRoot<'_>> {
        self.ids
            .iter()
            .zip(&self.batches)
            .zip(&self.infos)
            .map(|((&id, batch), info)| SortableRoot { id, batch, info })
            .collect()
    }
}
