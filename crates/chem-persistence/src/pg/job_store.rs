//! Durable backing store for the Task Runtime (C7, spec §4.7). Holds the
//! `job` row each queued unit of work claims and updates; the dequeue,
//! retry-backoff, and cooperative-cancellation policy itself lives in
//! `chem-tasks`, which depends on this trait rather than on `sqlx` directly.

use async_trait::async_trait;
use chem_domain::Job;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::rows::{job_kind_str, job_state_str, JobRow};
use crate::PgPool;

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn enqueue(&self, job: Job) -> Result<Job, PersistenceError>;

    /// Atomically claims at most one queued-and-due job from `queue`,
    /// transitioning it to `Running`. Returns `None` if nothing is due.
    async fn dequeue(&self, queue: &str) -> Result<Option<Job>, PersistenceError>;

    async fn get(&self, job_id: Uuid) -> Result<Job, PersistenceError>;

    async fn mark_succeeded(&self, job_id: Uuid) -> Result<Job, PersistenceError>;

    async fn mark_failed(&self, job_id: Uuid, error: &str) -> Result<Job, PersistenceError>;

    async fn mark_cancelled(&self, job_id: Uuid) -> Result<Job, PersistenceError>;

    /// Returns a job to `Queued` at `run_after`, bumping its attempt count.
    /// Used both for exponential-backoff retries and for a task
    /// self-rescheduling (e.g. prediction polling).
    async fn reschedule(&self, job_id: Uuid, run_after: DateTime<Utc>) -> Result<Job, PersistenceError>;

    async fn request_cancellation(&self, job_id: Uuid) -> Result<Job, PersistenceError>;

    async fn update_progress(&self, job_id: Uuid, completed: u64, failed: u64) -> Result<Job, PersistenceError>;

    /// Deletes terminal (`succeeded`, `failed`, `cancelled`) jobs last
    /// updated before `before`. Returns the number of rows removed. Backing
    /// operation for the `cleanup` queue's ambient housekeeping task.
    async fn purge_terminal_before(&self, before: DateTime<Utc>) -> Result<u64, PersistenceError>;
}

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const JOB_COLUMNS: &str = "job_id, kind, queue, state, total, completed, failed, attempts, max_attempts, \
                            last_error, payload, run_after, cancel_requested, created_at, updated_at";

#[async_trait]
impl JobStore for PgJobStore {
    async fn enqueue(&self, job: Job) -> Result<Job, PersistenceError> {
        let row: JobRow = sqlx::query_as(&format!(
            "INSERT INTO job (job_id, kind, queue, state, total, completed, failed, attempts, max_attempts, \
                               last_error, payload, run_after, cancel_requested) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {JOB_COLUMNS}"
        )).bind(job.job_id)
          .bind(job_kind_str(&job.kind))
          .bind(&job.queue)
          .bind(job_state_str(job.state))
          .bind(job.total as i64)
          .bind(job.completed as i64)
          .bind(job.failed as i64)
          .bind(job.attempts as i32)
          .bind(job.max_attempts as i32)
          .bind(&job.last_error)
          .bind(&job.payload)
          .bind(job.run_after)
          .bind(job.cancel_requested)
          .fetch_one(&self.pool)
          .await?;
        Job::try_from(row)
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<Job>, PersistenceError> {
        let row: Option<JobRow> = sqlx::query_as(&format!(
            "UPDATE job SET state = 'running', attempts = attempts + 1, updated_at = now() \
             WHERE job_id = ( \
                 SELECT job_id FROM job \
                 WHERE queue = $1 AND state = 'queued' AND run_after <= now() \
                 ORDER BY run_after ASC \
                 FOR UPDATE SKIP LOCKED \
                 LIMIT 1 \
             ) \
             RETURNING {JOB_COLUMNS}"
        )).bind(queue)
          .fetch_optional(&self.pool)
          .await?;
        row.map(Job::try_from).transpose()
    }

    async fn get(&self, job_id: Uuid) -> Result<Job, PersistenceError> {
        let row: JobRow =
            sqlx::query_as(&format!("SELECT {JOB_COLUMNS} FROM job WHERE job_id = $1")).bind(job_id)
                                                                                         .fetch_one(&self.pool)
                                                                                         .await?;
        Job::try_from(row)
    }

    async fn mark_succeeded(&self, job_id: Uuid) -> Result<Job, PersistenceError> {
        let row: JobRow = sqlx::query_as(&format!(
            "UPDATE job SET state = 'succeeded', updated_at = now() WHERE job_id = $1 RETURNING {JOB_COLUMNS}"
        )).bind(job_id)
          .fetch_one(&self.pool)
          .await?;
        Job::try_from(row)
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str) -> Result<Job, PersistenceError> {
        let row: JobRow = sqlx::query_as(&format!(
            "UPDATE job SET state = 'failed', last_error = $2, updated_at = now() \
             WHERE job_id = $1 RETURNING {JOB_COLUMNS}"
        )).bind(job_id)
          .bind(error)
          .fetch_one(&self.pool)
          .await?;
        Job::try_from(row)
    }

    async fn mark_cancelled(&self, job_id: Uuid) -> Result<Job, PersistenceError> {
        let row: JobRow = sqlx::query_as(&format!(
            "UPDATE job SET state = 'cancelled', updated_at = now() WHERE job_id = $1 RETURNING {JOB_COLUMNS}"
        )).bind(job_id)
          .fetch_one(&self.pool)
          .await?;
        Job::try_from(row)
    }

    async fn reschedule(&self, job_id: Uuid, run_after: DateTime<Utc>) -> Result<Job, PersistenceError> {
        let row: JobRow = sqlx::query_as(&format!(
            "UPDATE job SET state = 'queued', run_after = $2, updated_at = now() \
             WHERE job_id = $1 RETURNING {JOB_COLUMNS}"
        )).bind(job_id)
          .bind(run_after)
          .fetch_one(&self.pool)
          .await?;
        Job::try_from(row)
    }

    async fn request_cancellation(&self, job_id: Uuid) -> Result<Job, PersistenceError> {
        let row: JobRow = sqlx::query_as(&format!(
            "UPDATE job SET cancel_requested = true, updated_at = now() WHERE job_id = $1 RETURNING {JOB_COLUMNS}"
        )).bind(job_id)
          .fetch_one(&self.pool)
          .await?;
        Job::try_from(row)
    }

    async fn update_progress(&self, job_id: Uuid, completed: u64, failed: u64) -> Result<Job, PersistenceError> {
        let row: JobRow = sqlx::query_as(&format!(
            "UPDATE job SET completed = $2, failed = $3, updated_at = now() \
             WHERE job_id = $1 RETURNING {JOB_COLUMNS}"
        )).bind(job_id)
          .bind(completed as i64)
          .bind(failed as i64)
          .fetch_one(&self.pool)
          .await?;
        Job::try_from(row)
    }

    async fn purge_terminal_before(&self, before: DateTime<Utc>) -> Result<u64, PersistenceError> {
        let result = sqlx::query(
            "DELETE FROM job WHERE state IN ('succeeded', 'failed', 'cancelled') AND updated_at < $1"
        ).bind(before)
         .execute(&self.pool)
         .await?;
        Ok(result.rows_affected())
    }
}
