//! Worker threads for rebuilding dirty roots in parallel.
//!
//! Arbitration of one root reads only that root's [`RootInput`], so every
//! dirty root becomes one task on a shared executor. Inputs are handed over as
//! `Arc` snapshots; the context keeps ownership of the roots themselves.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use async_executor::Executor;
use tessera_batch::{BatchRootId, RootBatch, RootInput, build_root_batch};
use tessera_core::BatchingConfig;
use tessera_core::profiling::profile_function;

/// A fixed set of threads rebuilding batch roots.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tessera::TaskPool;
/// use tessera_batch::{BatchRootId, RootInput};
/// use tessera_core::BatchingConfig;
/// use tessera_core::alloc::IndexSlot;
///
/// let pool = TaskPool::new(2);
/// let root = BatchRootId::from_slot(IndexSlot::new(0, 0));
/// let batches = pool.rebuild_roots(
///     vec![(root, Arc::new(RootInput::new()))],
///     BatchingConfig::default(),
/// );
/// assert_eq!(batches[0].0, root);
/// assert!(batches[0].1.summary.is_empty());
/// ```
pub struct TaskPool {
    executor: Arc<Executor<'static>>,
    workers: Vec<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl TaskPool {
    /// Create a pool with `num_threads` workers.
    ///
    /// # Panics
    ///
    /// Panics if `num_threads` is 0 or a worker thread cannot be spawned.
    pub fn new(num_threads: usize) -> Self {
        assert!(num_threads > 0, "TaskPool needs at least one worker");

        let executor = Arc::new(Executor::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let workers = (0..num_threads)
            .map(|i| {
                let executor = executor.clone();
                let shutdown = shutdown.clone();
                thread::Builder::new()
                    .name(format!("tessera-batch-{i}"))
                    .spawn(move || {
                        while !shutdown.load(Ordering::Relaxed) {
                            if !executor.try_tick() {
                                thread::sleep(Duration::from_millis(1));
                            }
                        }
                    })
                    .unwrap_or_else(|e| panic!("Failed to spawn batching worker: {e}"))
            })
            .collect();

        tracing::debug!(workers = num_threads, "Batching task pool started");

        Self {
            executor,
            workers,
            shutdown,
        }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Rebuild every root in `jobs` on the workers.
    ///
    /// Results come back in `jobs` order regardless of which worker finished
    /// first, so the caller sees the same sequence as a sequential rebuild.
    pub fn rebuild_roots(
        &self,
        jobs: Vec<(BatchRootId, Arc<RootInput>)>,
        config: BatchingConfig,
    ) -> Vec<(BatchRootId, RootBatch)> {
        profile_function!();
        let tasks: Vec<_> = jobs
            .into_iter()
            .map(|(id, input)| {
                let task = self
                    .executor
                    .spawn(async move { build_root_batch(&input, &config) });
                (id, task)
            })
            .collect();
        tasks
            .into_iter()
            .map(|(id, task)| (id, pollster::block_on(task)))
            .collect()
    }
}

impl Default for TaskPool {
    /// One worker per core, minus the core driving the frame.
    fn default() -> Self {
        Self::new(num_cpus::get().saturating_sub(1).max(1))
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("Batching worker panicked");
            }
        }
    }
}

impl std::fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPool")
            .field("workers", &self.workers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use tessera_batch::{DrawCallDescriptor, Primitive, SubRootIndex, VisualPart};
    use tessera_core::Aabb;
    use tessera_core::alloc::IndexSlot;

    fn root_id(index: u32) -> BatchRootId {
        BatchRootId::from_slot(IndexSlot::new(0, index))
    }

    fn input_with_quads(count: u32) -> Arc<RootInput> {
        let mut input = RootInput::with_root_transform(Mat4::IDENTITY);
        for i in 0..count {
            let part = VisualPart::new(
                DrawCallDescriptor::block_2d(),
                i,
                Aabb::from_rect(i as f32 * 20.0, 0.0, 10.0, 10.0, 0.0),
            );
            input
                .primitives
                .insert(Primitive::single(SubRootIndex::ROOT, i, 0, part));
        }
        Arc::new(input)
    }

    #[test]
    fn test_worker_count() {
        let pool = TaskPool::new(2);
        assert_eq!(pool.worker_count(), 2);
    }

    #[test]
    fn test_default_leaves_a_core_free() {
        let pool = TaskPool::default();
        assert!(pool.worker_count() >= 1);
        assert!(pool.worker_count() <= num_cpus::get().max(1));
    }

    #[test]
    #[should_panic(expected = "TaskPool needs at least one worker")]
    fn test_zero_workers_panics() {
        TaskPool::new(0);
    }

    #[test]
    fn test_results_keep_job_order() {
        let pool = TaskPool::new(3);
        let jobs: Vec<_> = (0..8).map(|i| (root_id(i), input_with_quads(i))).collect();
        let config = BatchingConfig::default();

        let batches = pool.rebuild_roots(jobs.clone(), config);
        assert_eq!(batches.len(), jobs.len());
        for ((id, input), (batch_id, batch)) in jobs.iter().zip(&batches) {
            assert_eq!(id, batch_id);
            assert_eq!(batch.elements.len(), input.primitives.len());
            let sequential = build_root_batch(input, &config);
            assert_eq!(batch.summary.draw_calls(), sequential.summary.draw_calls());
        }
    }

    #[test]
    fn test_drop_joins_workers() {
        let pool = TaskPool::new(2);
        let jobs = vec![(root_id(0), input_with_quads(1))];
        let batches = pool.rebuild_roots(jobs, BatchingConfig::default());
        assert_eq!(batches.len(), 1);
        drop(pool);
    }
}
