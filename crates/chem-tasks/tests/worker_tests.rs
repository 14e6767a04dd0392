//! Exercises the worker pool's dequeue/retry/reschedule/cancellation
//! contract against an in-memory `JobStore`, without a real database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chem_domain::{Job, JobKind, JobState};
use chem_persistence::{JobStore, PersistenceError};
use chem_tasks::{Scheduler, TaskContext, TaskHandler, TaskOutcome, TaskRegistry, WorkerPool};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct InMemoryJobStore {
    jobs: Mutex<HashMap<Uuid, Job>>,
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn enqueue(&self, job: Job) -> Result<Job, PersistenceError> {
        self.jobs.lock().await.insert(job.job_id, job.clone());
        Ok(job)
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<Job>, PersistenceError> {
        let mut jobs = self.jobs.lock().await;
        let now = Utc::now();
        let candidate =
            jobs.values_mut()
                .filter(|j| j.queue == queue && j.state == JobState::Queued && j.run_after <= now)
                .min_by_key(|j| j.run_after)
                .map(|j| j.job_id);
        if let Some(id) = candidate {
            let job = jobs.get_mut(&id).unwrap();
            job.state = JobState::Running;
            job.attempts += 1;
            Ok(Some(job.clone()))
        } else {
            Ok(None)
        }
    }

    async fn get(&self, job_id: Uuid) -> Result<Job, PersistenceError> {
        self.jobs.lock().await.get(&job_id).cloned().ok_or(PersistenceError::NotFound)
    }

    async fn mark_succeeded(&self, job_id: Uuid) -> Result<Job, PersistenceError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(&job_id).ok_or(PersistenceError::NotFound)?;
        job.state = JobState::Succeeded;
        Ok(job.clone())
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str) -> Result<Job, PersistenceError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(&job_id).ok_or(PersistenceError::NotFound)?;
        job.state = JobState::Failed;
        job.last_error = Some(error.to_string());
        Ok(job.clone())
    }

    async fn mark_cancelled(&self, job_id: Uuid) -> Result<Job, PersistenceError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(&job_id).ok_or(PersistenceError::NotFound)?;
        job.state = JobState::Cancelled;
        Ok(job.clone())
    }

    async fn reschedule(&self, job_id: Uuid, run_after: DateTime<Utc>) -> Result<Job, PersistenceError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(&job_id).ok_or(PersistenceError::NotFound)?;
        job.state = JobState::Queued;
        job.run_after = run_after;
        Ok(job.clone())
    }

    async fn request_cancellation(&self, job_id: Uuid) -> Result<Job, PersistenceError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(&job_id).ok_or(PersistenceError::NotFound)?;
        job.cancel_requested = true;
        Ok(job.clone())
    }

    async fn update_progress(&self, job_id: Uuid, completed: u64, failed: u64) -> Result<Job, PersistenceError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(&job_id).ok_or(PersistenceError::NotFound)?;
        job.completed = completed;
        job.failed = failed;
        Ok(job.clone())
    }

    async fn purge_terminal_before(&self, _before: DateTime<Utc>) -> Result<u64, PersistenceError> {
        Ok(0)
    }
}

struct AlwaysSucceeds {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl TaskHandler for AlwaysSucceeds {
    fn kind(&self) -> JobKind {
        JobKind::Cleanup
    }

    async fn run(&self, _ctx: &TaskContext, _payload: serde_json::Value) -> Result<TaskOutcome, chem_tasks::TaskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TaskOutcome::Completed)
    }
}

struct AlwaysFails;

#[async_trait]
impl TaskHandler for AlwaysFails {
    fn kind(&self) -> JobKind {
        JobKind::PredictionSubmit
    }

    async fn run(&self, _ctx: &TaskContext, _payload: serde_json::Value) -> Result<TaskOutcome, chem_tasks::TaskError> {
        Err(chem_tasks::TaskError::HandlerFailed("simulated failure".to_string()))
    }
}

#[tokio::test]
async fn completed_task_marks_job_succeeded() {
    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::default());
    let scheduler = Scheduler::new(Arc::clone(&store));
    let job_id = scheduler.schedule_cleanup(serde_json::json!({})).await.unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = TaskRegistry::new();
    registry.register(Arc::new(AlwaysSucceeds { calls: Arc::clone(&calls) }));

    let job = store.dequeue(chem_tasks::queue::DEFAULT).await.unwrap().unwrap();
    assert_eq!(job.job_id, job_id);
    let handler = registry.lookup(&job.kind).unwrap();
    let ctx = TaskContext { job_id: job.job_id, attempts: job.attempts, max_attempts: job.max_attempts, cancel_requested: false };
    let outcome = handler.run(&ctx, job.payload.clone()).await.unwrap();
    assert!(matches!(outcome, TaskOutcome::Completed));
    store.mark_succeeded(job.job_id).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let final_job = store.get(job_id).await.unwrap();
    assert_eq!(final_job.state, JobState::Succeeded);
}

#[tokio::test]
async fn worker_pool_retries_then_gives_up() {
    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::default());
    let scheduler = Scheduler::new(Arc::clone(&store));
    let job_id = scheduler.schedule_prediction_submit(serde_json::json!({})).await.unwrap();

    let mut registry = TaskRegistry::new();
    registry.register(Arc::new(AlwaysFails));
    let registry = Arc::new(registry);
    let pool = WorkerPool::for_queues(Arc::clone(&store), registry, vec![chem_tasks::queue::AI_PREDICTIONS.to_string()]);
    let shutdown = chem_tasks::ShutdownSignal::new();
    let handles = pool.spawn(shutdown.clone());

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.stop();
    for h in handles {
        let _ = tokio::time::timeout(Duration::from_secs(1), h).await;
    }

    let job = store.get(job_id).await.unwrap();
    assert!(job.attempts >= 1);
    assert!(job.state == JobState::Queued || job.state == JobState::Failed);
}

#[tokio::test]
async fn cancellation_is_observed_before_execution() {
    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::default());
    let scheduler = Scheduler::new(Arc::clone(&store));
    let job_id = scheduler.schedule_cleanup(serde_json::json!({})).await.unwrap();
    scheduler.request_cancellation(job_id).await.unwrap();

    let job = store.dequeue(chem_tasks::queue::DEFAULT).await.unwrap().unwrap();
    assert!(job.cancel_requested);
    store.mark_cancelled(job.job_id).await.unwrap();

    let final_job = store.get(job_id).await.unwrap();
    assert_eq!(final_job.state, JobState::Cancelled);
}
