// src/coordinator/pool.rs
// =============================================================================
// This module spreads verification work over execution units.
//
// Two strategies, picked by the coordinator:
//
// 1. run_bounded: one stream of futures with at most N in flight
//    (buffer_unordered). Used directly for small runs, and by every
//    execution unit for its own chunks.
//
// 2. run_pool: for large runs. The task list is cut into chunks, the chunks
//    go into a shared queue, and a fixed number of execution units (tokio
//    tasks on the multi-threaded runtime) pull from it until it is empty.
//    Each unit sends back exactly one message per chunk: a summary (broken
//    links plus counts) or a failure. Per-URL results never cross the
//    channel, only the summary does.
//
// Rust concepts:
// - Arc: shared ownership of the verifier and the queue across tasks
// - mpsc channel: units report to the coordinator
// - catch_unwind: a panicking chunk becomes a failure message, not a hang
// =============================================================================

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::checker::Verifier;
use crate::error::CoordinatorError;
use crate::model::{BrokenLink, LinkTask, VerificationOutcome};

/// Hard ceiling on execution units, whatever the configuration says.
pub const MAX_WORKERS: usize = 16;
/// Chunks never get smaller than this.
pub const MIN_CHUNK_SIZE: usize = 10;
/// Each unit should see about this many chunks, for load balancing.
const CHUNKS_PER_WORKER: usize = 3;

/// What a batch of checks produced. Only broken links are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub broken: Vec<BrokenLink>,
    pub skipped: usize,
    pub ignored: usize,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: VerificationOutcome) {
        match outcome {
            VerificationOutcome::Broken(link) => self.broken.push(link),
            VerificationOutcome::Skipped { .. } => self.skipped += 1,
            VerificationOutcome::Ignored { .. } => self.ignored += 1,
        }
    }

    /// Folds a whole chunk result in at once.
    pub fn merge(&mut self, other: BatchSummary) {
        self.broken.extend(other.broken);
        self.skipped += other.skipped;
        self.ignored += other.ignored;
    }
}

/// Number of execution units: configured value, or twice the cores capped
/// at 8, always within 1..=MAX_WORKERS.
pub fn resolve_workers(configured: Option<usize>) -> usize {
    let workers = configured.unwrap_or_else(|| {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        (cores * 2).min(8)
    });
    workers.clamp(1, MAX_WORKERS)
}

/// Chunk size giving each unit several chunks.
pub fn chunk_size(task_count: usize, workers: usize) -> usize {
    let per_chunk = task_count.div_ceil(workers.max(1) * CHUNKS_PER_WORKER);
    per_chunk.max(MIN_CHUNK_SIZE)
}

/// Verifies `tasks` with at most `concurrency` requests in flight.
pub async fn run_bounded(
    verifier: Arc<Verifier>,
    tasks: Vec<LinkTask>,
    concurrency: usize,
) -> BatchSummary {
    let futures = tasks.into_iter().map(|task| {
        let verifier = verifier.clone();
        async move { verifier.verify(&task).await }
    });

    // Results come back as they complete, not in input order
    let mut outcomes = stream::iter(futures).buffer_unordered(concurrency.max(1));

    let mut summary = BatchSummary::default();
    while let Some(outcome) = outcomes.next().await {
        summary.record(outcome);
    }
    summary
}

// One message per chunk, success or failure
struct ChunkReport {
    unit: usize,
    chunk: usize,
    result: Result<BatchSummary, String>,
}

/// Runs `tasks` on a pool of `workers` execution units.
pub async fn run_pool(
    verifier: Arc<Verifier>,
    tasks: Vec<LinkTask>,
    workers: usize,
    unit_concurrency: usize,
) -> Result<BatchSummary, CoordinatorError> {
    if workers == 0 {
        return Err(CoordinatorError::PoolInit(
            "at least one execution unit is required".to_string(),
        ));
    }
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| CoordinatorError::PoolInit(e.to_string()))?;

    let size = chunk_size(tasks.len(), workers);
    let mut queue = VecDeque::new();
    let mut remaining = tasks;
    while !remaining.is_empty() {
        let rest = remaining.split_off(size.min(remaining.len()));
        queue.push_back((queue.len(), remaining));
        remaining = rest;
    }
    let chunk_count = queue.len();
    if chunk_count == 0 {
        return Ok(BatchSummary::default());
    }

    let units = workers.min(chunk_count);
    info!(
        units,
        chunks = chunk_count,
        chunk_size = size,
        "Starting execution units"
    );

    let queue = Arc::new(Mutex::new(queue));
    let (tx, mut rx) = mpsc::channel::<ChunkReport>(chunk_count);

    let mut handles = Vec::with_capacity(units);
    for unit in 0..units {
        let queue = queue.clone();
        let tx = tx.clone();
        let verifier = verifier.clone();
        handles.push(runtime.spawn(async move {
            loop {
                // Lock only long enough to take the next chunk
                let next = queue.lock().await.pop_front();
                let Some((chunk, tasks)) = next else {
                    break;
                };
                debug!(unit, chunk, tasks = tasks.len(), "Unit picked up chunk");

                let work = run_bounded(verifier.clone(), tasks, unit_concurrency);
                let result = AssertUnwindSafe(work)
                    .catch_unwind()
                    .await
                    .map_err(panic_message);

                if tx.send(ChunkReport { unit, chunk, result }).await.is_err() {
                    // Coordinator gave up on the run
                    break;
                }
            }
        }));
    }
    // Units hold the only senders now; the channel closes when they finish
    drop(tx);

    let mut summary = BatchSummary::default();
    let mut received = 0;
    while received < chunk_count {
        let Some(report) = rx.recv().await else {
            break;
        };
        received += 1;
        match report.result {
            Ok(chunk_summary) => {
                debug!(
                    unit = report.unit,
                    chunk = report.chunk,
                    broken = chunk_summary.broken.len(),
                    "Chunk finished"
                );
                summary.merge(chunk_summary);
                info!("Progress: {}/{} chunks", received, chunk_count);
            }
            Err(message) => {
                for handle in &handles {
                    handle.abort();
                }
                return Err(CoordinatorError::ChunkFailed {
                    unit: report.unit,
                    chunk: report.chunk,
                    message,
                });
            }
        }
    }

    for (unit, handle) in handles.into_iter().enumerate() {
        if let Err(e) = handle.await {
            return Err(CoordinatorError::UnitLost {
                unit,
                message: e.to_string(),
            });
        }
    }

    if received < chunk_count {
        return Err(CoordinatorError::UnitLost {
            unit: 0,
            message: format!("only {received} of {chunk_count} chunks reported back"),
        });
    }

    Ok(summary)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "execution unit panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_size_has_a_floor() {
        assert_eq!(chunk_size(51, 8), 10);
        assert_eq!(chunk_size(0, 4), 10);
    }

    #[test]
    fn test_chunk_size_gives_each_worker_three_chunks() {
        // 1200 tasks over 8 workers -> 24 chunks of 50
        assert_eq!(chunk_size(1200, 8), 50);
        assert_eq!(chunk_size(1201, 8), 51);
    }

    #[test]
    fn test_resolve_workers_clamps() {
        assert_eq!(resolve_workers(Some(64)), MAX_WORKERS);
        assert_eq!(resolve_workers(Some(0)), 1);
        assert_eq!(resolve_workers(Some(5)), 5);
        let derived = resolve_workers(None);
        assert!((1..=8).contains(&derived));
    }

    #[test]
    fn test_summary_merge() {
        let mut total = BatchSummary {
            broken: vec![],
            skipped: 1,
            ignored: 2,
        };
        total.merge(BatchSummary {
            broken: vec![],
            skipped: 3,
            ignored: 4,
        });
        assert_eq!(total.skipped, 4);
        assert_eq!(total.ignored, 6);
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new("bang".to_string())), "bang");
        assert_eq!(panic_message(Box::new(42)), "execution unit panicked");
    }
}
