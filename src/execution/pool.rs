//! The bounded worker pool and the fan-out stage runner.
//!
//! Both fan-out stages run on the same rayon-backed pool. The merged
//! dataset is broadcast once as an immutable shared context before any
//! task runs; workers receive it as an explicit parameter, never through
//! a global lookup.

use crate::core::error::{PipelineError, PipelineResult};
use crate::execution::stage::{Stage, StageOutcome, StageReport};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// A bounded set of parallel worker threads.
///
/// The pool's lifetime brackets the two fan-out stages: it is created by
/// the orchestrator at the start of a run and torn down by scope exit
/// when the run completes or aborts, exactly once on every path.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Create a pool with `workers` threads.
    ///
    /// `workers == 0` selects the detected hardware concurrency. The
    /// count is a tunable, not a correctness parameter; operators lower
    /// it on memory-constrained machines.
    pub fn new(workers: usize) -> PipelineResult<Self> {
        let workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            workers
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("strath-worker-{}", i))
            .build()
            .map_err(|e| PipelineError::PoolBuild(e.to_string()))?;

        Ok(Self { pool, workers })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Publish an immutable shared value to every worker.
    ///
    /// Must be called before `run_stage`; the returned handle is the
    /// only way tasks see shared state, so the broadcast happens-before
    /// any task execution by construction.
    pub fn broadcast<C: Send + Sync>(&self, value: C) -> Arc<C> {
        Arc::new(value)
    }

    /// Dispatch exactly one task per item and collect outcomes in item
    /// order, regardless of completion order across workers.
    ///
    /// A panicking task is captured as a `Fault` outcome for that item
    /// only; sibling tasks run to completion. The caller gates on the
    /// returned report.
    pub fn run_stage<C, T>(
        &self,
        stage: Stage,
        items: &[String],
        ctx: &Arc<C>,
        task: T,
    ) -> StageReport
    where
        C: Send + Sync,
        T: Fn(&str, &C) -> StageOutcome + Send + Sync,
    {
        log::info!(
            "{} stage: dispatching {} item(s) across {} worker(s)",
            stage,
            items.len(),
            self.workers
        );
        let start = Instant::now();
        let slowest: Mutex<(String, u64)> = Mutex::new((String::new(), 0));

        let outcomes: Vec<(String, StageOutcome)> = self.pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    let item_start = Instant::now();
                    let outcome = catch_unwind(AssertUnwindSafe(|| task(item, ctx)))
                        .unwrap_or_else(|payload| StageOutcome::Fault(panic_message(payload)));
                    let elapsed_ms = item_start.elapsed().as_millis() as u64;
                    {
                        let mut top = slowest.lock();
                        if elapsed_ms >= top.1 {
                            *top = (item.clone(), elapsed_ms);
                        }
                    }
                    (item.clone(), outcome)
                })
                .collect()
        });

        let failed = outcomes.iter().filter(|(_, o)| !o.is_ok()).count();
        let (slow_item, slow_ms) = slowest.into_inner();
        log::info!(
            "{} stage: {} ok, {} abnormal (slowest '{}' at {} ms)",
            stage,
            outcomes.len() - failed,
            failed,
            slow_item,
            slow_ms
        );

        let mut report = StageReport::new(stage, outcomes);
        report.duration_ms = start.elapsed().as_millis() as u64;
        report
    }
}

/// Extract a readable message from a panic payload.
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}
