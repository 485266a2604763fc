//! The batching context: owns every batch root and drives a frame.
//!
//! A frame is two calls. [`BatchingContext::process_dirty_roots`] rebuilds
//! the draw call summary of every root mutated since the last frame, then
//! [`BatchingContext::sort_camera`] runs once per camera and stores the
//! adjusted draw-call bounds the renderer uploads.

use std::sync::Arc;

use ahash::AHashMap;
use glam::Mat4;
use indexmap::IndexSet;
use tessera_batch::{
    BatchRootId, CameraId, DrawCallSummary, HierarchyRootId, Primitive, PrimitiveIndex,
    RootBatch, RootInput, SortGroupId, SubRoot, SubRootIndex, build_root_batch,
};
use tessera_core::BatchingConfig;
use tessera_core::alloc::{Relocation, SparseSet};
use tessera_core::profiling::{profile_function, profile_scope};
use tessera_sort::{
    CameraSortRunner, CameraView, ProcessedDrawCall, RootSortInfo, RootVisibility, SortGroupInfo,
    SortStats, SortableRoot,
};

use crate::task_pool::TaskPool;

/// Errors returned by [`BatchingContext`] mutations.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextError {
    /// The root was destroyed, or the handle belongs to another context.
    UnknownRoot(BatchRootId),
    /// The root has no primitive at this index.
    UnknownPrimitive {
        root: BatchRootId,
        primitive: PrimitiveIndex,
    },
    /// A primitive names a sub-root the root does not have.
    UnknownSubRoot {
        root: BatchRootId,
        sub_root: SubRootIndex,
    },
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextError::UnknownRoot(root) => write!(f, "Unknown batch root {:?}", root.slot()),
            ContextError::UnknownPrimitive { root, primitive } => write!(
                f,
                "Batch root {:?} has no primitive {}",
                root.slot(),
                primitive.0
            ),
            ContextError::UnknownSubRoot { root, sub_root } => write!(
                f,
                "Batch root {:?} has no sub-root {}",
                root.slot(),
                sub_root.0
            ),
        }
    }
}

impl std::error::Error for ContextError {}

pub type ContextResult<T> = Result<T, ContextError>;

/// Host-controlled settings of a batch root.
#[derive(Debug, Clone, PartialEq)]
pub struct RootSettings {
    /// World transform of the batch root itself.
    pub transform: Mat4,
    /// Cameras the root renders for.
    pub visibility: RootVisibility,
    /// Looked up in the context's sort-group table when sorting.
    pub sort_group: Option<SortGroupId>,
    /// Hierarchy the root belongs to.
    pub hierarchy_root: HierarchyRootId,
    /// Traversal position within the hierarchy. Later roots win coplanar ties.
    pub hierarchy_order: u32,
}

impl Default for RootSettings {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            visibility: RootVisibility::World,
            sort_group: None,
            hierarchy_root: HierarchyRootId::default(),
            hierarchy_order: 0,
        }
    }
}

impl RootSettings {
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_visibility(mut self, visibility: RootVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_sort_group(mut self, group: SortGroupId) -> Self {
        self.sort_group = Some(group);
        self
    }

    pub fn with_hierarchy(mut self, root: HierarchyRootId, order: u32) -> Self {
        self.hierarchy_root = root;
        self.hierarchy_order = order;
        self
    }
}

struct BatchRoot {
    settings: RootSettings,
    /// Shared with worker tasks while the root is being rebuilt.
    input: Arc<RootInput>,
    batch: RootBatch,
}

impl BatchRoot {
    fn new(settings: RootSettings) -> Self {
        let input = Arc::new(RootInput::with_root_transform(settings.transform));
        Self {
            settings,
            input,
            batch: RootBatch::default(),
        }
    }

    fn input_mut(&mut self) -> &mut RootInput {
        Arc::make_mut(&mut self.input)
    }
}

/// Owns batch roots, their arbitration output and the camera sort.
pub struct BatchingContext {
    config: BatchingConfig,
    roots: SparseSet<BatchRoot>,
    sort_groups: AHashMap<SortGroupId, SortGroupInfo>,
    dirty: IndexSet<BatchRootId>,
    task_pool: Option<TaskPool>,
    runner: CameraSortRunner,
}

impl BatchingContext {
    /// A context that processes roots on the calling thread.
    pub fn new(config: BatchingConfig) -> Self {
        Self {
            config,
            roots: SparseSet::new(),
            sort_groups: AHashMap::new(),
            dirty: IndexSet::new(),
            task_pool: None,
            runner: CameraSortRunner::new(config),
        }
    }

    /// Process dirty roots on `pool` when [`BatchingConfig::parallel_arbitration`] is set.
    pub fn with_task_pool(mut self, pool: TaskPool) -> Self {
        self.task_pool = Some(pool);
        self
    }

    /// Configuration used by arbitration and sorting.
    pub fn config(&self) -> &BatchingConfig {
        &self.config
    }

    /// Replace the configuration. Every root is rebuilt on the next frame.
    pub fn set_config(&mut self, config: BatchingConfig) {
        self.config = config;
        self.runner.set_config(config);
        let ids: Vec<BatchRootId> = self
            .roots
            .iter()
            .map(|(slot, _)| BatchRootId::from_slot(slot))
            .collect();
        self.dirty.extend(ids);
    }

    /// Create an empty root. It is built on the next [`process_dirty_roots`](Self::process_dirty_roots).
    pub fn create_root(&mut self, settings: RootSettings) -> BatchRootId {
        let id = BatchRootId::from_slot(self.roots.push(BatchRoot::new(settings)));
        self.dirty.insert(id);
        tracing::debug!(root = ?id.slot(), "Created batch root");
        id
    }

    /// Destroy a root and drop its sort output for every camera.
    ///
    /// The handle, and any copy of it, is rejected from then on.
    pub fn destroy_root(&mut self, root: BatchRootId) -> ContextResult<()> {
        self.roots
            .remove(root.slot())
            .ok_or(ContextError::UnknownRoot(root))?;
        self.dirty.shift_remove(&root);
        self.runner.forget_root(root);
        tracing::debug!(root = ?root.slot(), "Destroyed batch root");
        Ok(())
    }

    /// Replace a root's settings. Only a transform change needs a rebuild.
    pub fn set_root_settings(
        &mut self,
        root: BatchRootId,
        settings: RootSettings,
    ) -> ContextResult<()> {
        let entry = self.root_mut(root)?;
        let moved = entry.settings.transform != settings.transform;
        if moved && let Some(base) = entry.input_mut().sub_roots.first_mut() {
            base.world = settings.transform;
        }
        entry.settings = settings;
        if moved {
            self.dirty.insert(root);
        }
        Ok(())
    }

    /// Current settings of a live root.
    pub fn root_settings(&self, root: BatchRootId) -> Option<&RootSettings> {
        self.roots.try_get(root.slot()).map(|r| &r.settings)
    }

    /// Replace the sub-roots below the batch root.
    ///
    /// The first entry becomes [`SubRootIndex`] 1; index 0 stays the batch root.
    pub fn set_sub_roots(
        &mut self,
        root: BatchRootId,
        sub_roots: impl IntoIterator<Item = SubRoot>,
    ) -> ContextResult<()> {
        let input = self.root_mut(root)?.input_mut();
        input.sub_roots.truncate(1);
        input.sub_roots.extend(sub_roots);
        self.dirty.insert(root);
        Ok(())
    }

    /// Append a primitive to a root and mark the root dirty.
    pub fn insert_primitive(
        &mut self,
        root: BatchRootId,
        primitive: Primitive,
    ) -> ContextResult<PrimitiveIndex> {
        let entry = self.root_mut(root)?;
        check_sub_root(root, &entry.input, primitive.sub_root)?;
        let index = entry.input_mut().primitives.insert(primitive);
        self.dirty.insert(root);
        Ok(index)
    }

    /// Replace a primitive in place and mark the root dirty.
    pub fn update_primitive(
        &mut self,
        root: BatchRootId,
        index: PrimitiveIndex,
        primitive: Primitive,
    ) -> ContextResult<()> {
        let entry = self.root_mut(root)?;
        check_sub_root(root, &entry.input, primitive.sub_root)?;
        entry
            .input_mut()
            .primitives
            .update(index, primitive)
            .map_err(|_| ContextError::UnknownPrimitive {
                root,
                primitive: index,
            })?;
        self.dirty.insert(root);
        Ok(())
    }

    /// Swap-remove a primitive.
    ///
    /// The last primitive of the root moves into the freed slot; the returned
    /// [`Relocation`] names the move so the caller can rewrite its handles.
    /// Overlap lists inside the root are already fixed up.
    pub fn remove_primitive(
        &mut self,
        root: BatchRootId,
        index: PrimitiveIndex,
    ) -> ContextResult<(Primitive, Option<Relocation>)> {
        let removed = self
            .root_mut(root)?
            .input_mut()
            .primitives
            .remove(index)
            .map_err(|_| ContextError::UnknownPrimitive {
                root,
                primitive: index,
            })?;
        self.dirty.insert(root);
        Ok(removed)
    }

    /// Replace the overlap list of one primitive.
    pub fn set_overlaps(
        &mut self,
        root: BatchRootId,
        index: PrimitiveIndex,
        overlaps: impl IntoIterator<Item = PrimitiveIndex>,
    ) -> ContextResult<()> {
        self.root_mut(root)?
            .input_mut()
            .primitives
            .set_overlaps(index, overlaps)
            .map_err(|_| ContextError::UnknownPrimitive {
                root,
                primitive: index,
            })?;
        self.dirty.insert(root);
        Ok(())
    }

    /// Define or redefine a sort group. Applies from the next sort.
    pub fn set_sort_group(&mut self, group: SortGroupId, info: SortGroupInfo) {
        self.sort_groups.insert(group, info);
    }

    /// Roots still naming a removed group sort with [`SortGroupInfo::DEFAULT`].
    pub fn remove_sort_group(&mut self, group: SortGroupId) -> Option<SortGroupInfo> {
        self.sort_groups.remove(&group)
    }

    /// Sort keys of a group, [`SortGroupInfo::DEFAULT`] if it is unknown.
    pub fn sort_group(&self, group: SortGroupId) -> SortGroupInfo {
        self.sort_groups
            .get(&group)
            .copied()
            .unwrap_or(SortGroupInfo::DEFAULT)
    }

    /// Whether the root changed since it was last built.
    pub fn is_dirty(&self, root: BatchRootId) -> bool {
        self.dirty.contains(&root)
    }

    /// Number of live roots.
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Rebuild every dirty root. Returns how many were rebuilt.
    ///
    /// Roots are rebuilt whole, on the task pool when one is attached,
    /// parallel arbitration is enabled and more than one root is dirty.
    pub fn process_dirty_roots(&mut self) -> usize {
        profile_function!();
        let dirty: Vec<BatchRootId> = self
            .dirty
            .drain(..)
            .filter(|id| self.roots.contains(id.slot()))
            .collect();
        if dirty.is_empty() {
            return 0;
        }

        let config = self.config;
        let results: Vec<(BatchRootId, RootBatch)> = match &self.task_pool {
            Some(pool) if config.parallel_arbitration && dirty.len() > 1 => {
                profile_scope!("parallel_arbitration");
                let jobs = dirty
                    .iter()
                    .filter_map(|&id| Some((id, self.roots.try_get(id.slot())?.input.clone())))
                    .collect();
                pool.rebuild_roots(jobs, config)
            }
            _ => dirty
                .iter()
                .filter_map(|&id| {
                    let root = self.roots.try_get(id.slot())?;
                    Some((id, build_root_batch(&root.input, &config)))
                })
                .collect(),
        };

        let rebuilt = results.len();
        for (id, batch) in results {
            if !batch.errors.is_empty() {
                tracing::warn!(
                    root = ?id.slot(),
                    skipped = batch.errors.len(),
                    "Batch root rebuilt with skipped elements"
                );
            }
            if let Some(root) = self.roots.try_get_mut(id.slot()) {
                root.batch = batch;
            }
        }
        tracing::trace!(rebuilt, "Processed dirty batch roots");
        rebuilt
    }

    /// Sort all roots visible to `camera` and store their draw-call bounds.
    ///
    /// An invalid camera is logged and its previous output is kept.
    pub fn sort_camera(&mut self, camera: &CameraView) -> Option<SortStats> {
        profile_function!();
        let entries: Vec<(BatchRootId, &RootBatch, RootSortInfo)> = self
            .roots
            .iter()
            .map(|(slot, root)| {
                let settings = &root.settings;
                let info = RootSortInfo {
                    visibility: settings.visibility.clone(),
                    sort_group: settings
                        .sort_group
                        .and_then(|g| self.sort_groups.get(&g).copied())
                        .unwrap_or(SortGroupInfo::DEFAULT),
                    hierarchy_root: settings.hierarchy_root,
                    hierarchy_order: settings.hierarchy_order,
                };
                (BatchRootId::from_slot(slot), &root.batch, info)
            })
            .collect();
        let roots: Vec<SortableRoot<'_>> = entries
            .iter()
            .map(|(id, batch, info)| SortableRoot {
                id: *id,
                batch,
                info,
            })
            .collect();

        match self.runner.sort(camera, &roots) {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::error!("Camera sort failed, keeping previous output: {}", e);
                None
            }
        }
    }

    /// Adjusted bounds of every draw call of `root` for `camera`, in draw-call order.
    pub fn get_draw_call_bounds(
        &self,
        camera: CameraId,
        root: BatchRootId,
    ) -> Option<&[ProcessedDrawCall]> {
        self.runner.get_draw_call_bounds(camera, root)
    }

    /// Stop keeping output for a camera that will not render again.
    pub fn forget_camera(&mut self, camera: CameraId) {
        self.runner.forget_camera(camera);
    }

    /// Draw calls of a root as of its last build.
    pub fn draw_call_summary(&self, root: BatchRootId) -> Option<&DrawCallSummary> {
        self.root_batch(root).map(|batch| &batch.summary)
    }

    /// Full arbitration output of a root as of its last build.
    pub fn root_batch(&self, root: BatchRootId) -> Option<&RootBatch> {
        self.roots.try_get(root.slot()).map(|r| &r.batch)
    }

    /// Current primitives and sub-roots of a root.
    pub fn root_input(&self, root: BatchRootId) -> Option<&RootInput> {
        self.roots.try_get(root.slot()).map(|r| r.input.as_ref())
    }

    fn root_mut(&mut self, root: BatchRootId) -> ContextResult<&mut BatchRoot> {
        self.roots
            .try_get_mut(root.slot())
            .ok_or(ContextError::UnknownRoot(root))
    }
}

impl Default for BatchingContext {
    fn default() -> Self {
        Self::new(BatchingConfig::default())
    }
}

impl std::fmt::Debug for BatchingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchingContext")
            .field("roots", &self.roots.len())
            .field("dirty", &self.dirty.len())
            .field("sort_groups", &self.sort_groups.len())
            .field("task_pool", &self.task_pool)
            .finish()
    }
}

fn check_sub_root(root: BatchRootId, input: &RootInput, sub_root: SubRootIndex) -> ContextResult<()> {
    match input.sub_root(sub_root) {
        Some(_) => Ok(()),
        None => Err(ContextError::UnknownSubRoot { root, sub_root }),
    }
}
