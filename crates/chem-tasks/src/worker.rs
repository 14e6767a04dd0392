//! Concurrent queue-draining worker pool (spec §4.7, §5).
//!
//! One tokio task per named queue polls `JobStore::dequeue` in a loop; tasks
//! within a queue execute sequentially, but queues drain concurrently, and
//! there is no ordering guarantee across them. Shutdown is a plain
//! `Arc<AtomicBool>` flag checked between iterations, mirroring the
//! operational-signal pattern worker loops in this pack use for graceful
//! stop rather than pulling in a dedicated cancellation-token crate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chem_persistence::JobStore;
use chrono::Utc;
use tokio::task::JoinHandle;

use crate::error::TaskError;
use crate::handler::{TaskContext, TaskOutcome};
use crate::queue::ALL_QUEUES;
use crate::registry::TaskRegistry;

pub const DEFAULT_RETRY_DELAY_S: u64 = 3;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
const EMPTY_QUEUE_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct WorkerPool {
    store: Arc<dyn JobStore>,
    registry: Arc<TaskRegistry>,
    queues: Vec<String>,
}

impl WorkerPool {
    /// Drains every named queue from spec §4.7. Use [`WorkerPool::for_queues`]
    /// to restrict a process to a subset (e.g. a dedicated prediction worker).
    pub fn new(store: Arc<dyn JobStore>, registry: Arc<TaskRegistry>) -> Self {
        Self::for_queues(store, registry, ALL_QUEUES.iter().map(|q| q.to_string()).collect())
    }

    pub fn for_queues(store: Arc<dyn JobStore>, registry: Arc<TaskRegistry>, queues: Vec<String>) -> Self {
        Self { store, registry, queues }
    }

    /// Spawns one drain loop per queue and returns their join handles. The
    /// caller keeps `shutdown` to request a cooperative stop and can `.await`
    /// the handles to wait for the loops to notice and exit.
    pub fn spawn(&self, shutdown: ShutdownSignal) -> Vec<JoinHandle<()>> {
        self.queues
            .iter()
            .map(|queue| {
                let store = Arc::clone(&self.store);
                let registry = Arc::clone(&self.registry);
                let shutdown = shutdown.clone();
                let queue = queue.clone();
                tokio::spawn(async move { drain_queue(store, registry, queue, shutdown).await })
            })
            .collect()
    }
}

async fn drain_queue(store: Arc<dyn JobStore>, registry: Arc<TaskRegistry>, queue: String, shutdown: ShutdownSignal) {
    while !shutdown.is_stopped() {
        match store.dequeue(&queue).await {
            Ok(Some(job)) => {
                if let Err(e) = execute_one(&store, &registry, job).await {
                    log::warn!("task on queue '{queue}' ended in error: {e}");
                }
            }
            Ok(None) => tokio::time::sleep(EMPTY_QUEUE_POLL_INTERVAL).await,
            Err(e) => {
                log::error!("queue '{queue}' dequeue failed: {e}");
                tokio::time::sleep(EMPTY_QUEUE_POLL_INTERVAL).await;
            }
        }
    }
}

async fn execute_one(store: &Arc<dyn JobStore>, registry: &TaskRegistry, job: chem_domain::Job) -> Result<(), TaskError> {
    if job.cancel_requested {
        store.mark_cancelled(job.job_id).await?;
        return Err(TaskError::Cancelled);
    }

    let handler = match registry.lookup(&job.kind) {
        Some(h) => h,
        None => {
            store.mark_failed(job.job_id, "no handler registered for this job kind").await?;
            return Err(TaskError::HandlerFailed(format!("unregistered kind for job {}", job.job_id)));
        }
    };

    let ctx = TaskContext { job_id: job.job_id,
                             attempts: job.attempts,
                             max_attempts: job.max_attempts,
                             cancel_requested: job.cancel_requested };

    match handler.run(&ctx, job.payload.clone()).await {
        Ok(TaskOutcome::Completed) => {
            store.mark_succeeded(job.job_id).await?;
            Ok(())
        }
        Ok(TaskOutcome::Reschedule { after_s }) => {
            let run_after = Utc::now() + chrono::Duration::seconds(after_s as i64);
            store.reschedule(job.job_id, run_after).await?;
            Ok(())
        }
        Err(e) => {
            if job.attempts < job.max_attempts {
                let delay_s = DEFAULT_RETRY_DELAY_S * 2u64.pow(job.attempts.saturating_sub(1).min(16));
                let run_after = Utc::now() + chrono::Duration::seconds(delay_s as i64);
                store.reschedule(job.job_id, run_after).await?;
            } else {
                store.mark_failed(job.job_id, &e.to_string()).await?;
            }
            Err(e)
        }
    }
}
