//! The per-camera sort pass.
//!
//! Stages run strictly in sequence: select, gather, seed order, dependency
//! discovery, resolve, per-draw-call bounds. Each stage is a public function
//! so it can be driven on its own; [`CameraSortRunner::sort`] chains them and
//! keeps the latest output of every camera.

use ahash::AHashMap;
use tessera_batch::{BatchRootId, CameraId, CoplanarSetIdentifier, RootBatch};
use tessera_core::BatchingConfig;
use tessera_core::profiling::{profile_function, profile_scope};

use crate::bounds::{ResolvedSets, compute_draw_call_bounds};
use crate::camera::CameraView;
use crate::dependencies::discover_dependencies;
use crate::error::SortResult;
use crate::gather::{gather, sort_coplanar_sets};
use crate::processed::ProcessedDrawCall;
use crate::resolve::resolve;
use crate::visibility::RootSortInfo;

/// A batch root as seen by the sort: its arbitration output and sort keys.
#[derive(Debug, Clone, Copy)]
pub struct SortableRoot<'a> {
    /// Handle the output is stored under.
    pub id: BatchRootId,
    /// Latest arbitration output of the root.
    pub batch: &'a RootBatch,
    /// Visibility and tie-break keys of the root.
    pub info: &'a RootSortInfo,
}

/// Counters from one sort pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortStats {
    /// Roots visible to the camera.
    pub roots_rendered: usize,
    /// Coplanar sets with flat content that survived culling.
    pub sets_gathered: usize,
    /// Coplanar sets entirely behind the camera or with non-finite bounds.
    pub sets_culled: usize,
    /// Renders-over edges discovered between sets.
    pub edges: usize,
    /// Edges dropped to break dependency cycles.
    pub broken_edges: usize,
    /// Processed draw calls written for the camera.
    pub draw_calls: usize,
}

/// Indices of the roots `camera` should sort, in input order.
pub fn select_roots(camera: &CameraView, roots: &[SortableRoot<'_>]) -> Vec<usize> {
    roots
        .iter()
        .enumerate()
        .filter(|(_, root)| root.info.visibility.should_render(camera))
        .map(|(i, _)| i)
        .collect()
}

type CameraOutput = AHashMap<BatchRootId, Vec<ProcessedDrawCall>>;

/// Runs camera sorts and owns their per-camera output tables.
#[derive(Debug, Default)]
pub struct CameraSortRunner {
    config: BatchingConfig,
    outputs: AHashMap<CameraId, CameraOutput>,
}

impl CameraSortRunner {
    /// Create a runner with no stored output.
    pub fn new(config: BatchingConfig) -> Self {
        Self {
            config,
            outputs: AHashMap::new(),
        }
    }

    /// Tolerances used by dependency discovery and depth nudging.
    pub fn config(&self) -> &BatchingConfig {
        &self.config
    }

    /// Replace the configuration. Takes effect on the next sort.
    pub fn set_config(&mut self, config: BatchingConfig) {
        self.config = config;
    }

    /// Sort every root visible to `camera` and replace that camera's output.
    ///
    /// On error the camera's previous output is left untouched.
    pub fn sort(&mut self, camera: &CameraView, roots: &[SortableRoot<'_>]) -> SortResult<SortStats> {
        profile_function!();
        camera.validate()?;

        let selected = select_roots(camera, roots);
        let mut gathered = gather(camera, roots, &selected);
        sort_coplanar_sets(&mut gathered.sets);

        let mut graph = discover_dependencies(camera, &gathered.sets, &self.config);
        let edges = graph.edge_count();
        let resolution = resolve(&mut graph, &gathered.sets, &self.config);

        let lookup: AHashMap<CoplanarSetIdentifier, usize> = gathered
            .sets
            .iter()
            .enumerate()
            .map(|(i, set)| (set.key, i))
            .collect();
        let resolved = ResolvedSets {
            sets: &gathered.sets,
            lookup: &lookup,
            resolution: &resolution,
        };

        let output = self.outputs.entry(camera.id).or_default();
        output.clear();
        let mut draw_calls = 0;
        {
            profile_scope!("draw_call_bounds");
            for &index in &selected {
                let root = &roots[index];
                let processed = compute_draw_call_bounds(camera, root, resolved, &self.config);
                draw_calls += processed.len();
                output.insert(root.id, processed);
            }
        }

        let stats = SortStats {
            roots_rendered: selected.len(),
            sets_gathered: gathered.sets.len(),
            sets_culled: gathered.culled,
            edges,
            broken_edges: resolution.broken_edges.len(),
            draw_calls,
        };
        tracing::debug!(camera = camera.id.0, ?stats, "Camera sort complete");
        Ok(stats)
    }

    /// Latest output of `camera` for `root`, one entry per draw call.
    pub fn get_draw_call_bounds(
        &self,
        camera: CameraId,
        root: BatchRootId,
    ) -> Option<&[ProcessedDrawCall]> {
        self.outputs
            .get(&camera)
            .and_then(|output| output.get(&root))
            .map(Vec::as_slice)
    }

    /// Drop a destroyed root from every camera's output.
    pub fn forget_root(&mut self, root: BatchRootId) {
        for output in self.outputs.values_mut() {
            output.remove(&root);
        }
    }

    /// Drop all output of a camera that will not render again.
    pub fn forget_camera(&mut self, camera: CameraId) {
        self.outputs.remove(&camera);
    }

    /// Cameras with stored output.
    pub fn cameras(&self) -> impl Iterator<Item = CameraId> + '_ {
        self.outputs.keys().copied()
    }
}
