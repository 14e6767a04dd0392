//! Thin typed wrapper over `JobStore::enqueue` for callers that just want
//! to schedule a named-kind task onto its queue (spec §4.7 routing/serialization).

use std::sync::Arc;

use chem_domain::{Job, JobKind};
use chem_persistence::JobStore;
use chrono::Utc;
use uuid::Uuid;

use crate::error::TaskError;
use crate::queue;

pub struct Scheduler {
    store: Arc<dyn JobStore>,
}

impl Scheduler {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    pub async fn schedule_csv_ingestion(&self, payload: serde_json::Value) -> Result<Uuid, TaskError> {
        self.enqueue(JobKind::CsvIngestion, queue::CSV_PROCESSING, payload, Utc::now()).await
    }

    pub async fn schedule_prediction_submit(&self, payload: serde_json::Value) -> Result<Uuid, TaskError> {
        self.enqueue(JobKind::PredictionSubmit, queue::AI_PREDICTIONS, payload, Utc::now()).await
    }

    pub async fn schedule_prediction_poll(&self,
                                          payload: serde_json::Value,
                                          after_s: u64)
                                          -> Result<Uuid, TaskError> {
        let run_after = Utc::now() + chrono::Duration::seconds(after_s as i64);
        self.enqueue(JobKind::PredictionPoll, queue::AI_PREDICTIONS, payload, run_after).await
    }

    pub async fn schedule_cleanup(&self, payload: serde_json::Value) -> Result<Uuid, TaskError> {
        self.enqueue(JobKind::Cleanup, queue::CLEANUP, payload, Utc::now()).await
    }

    pub async fn request_cancellation(&self, job_id: Uuid) -> Result<(), TaskError> {
        self.store.request_cancellation(job_id).await?;
        Ok(())
    }

    async fn enqueue(&self,
                      kind: JobKind,
                      queue: &str,
                      payload: serde_json::Value,
                      run_after: chrono::DateTime<Utc>)
                      -> Result<Uuid, TaskError> {
        let now = Utc::now();
        let mut job = Job::new(Uuid::new_v4(), kind, queue, payload, now);
        job.run_after = run_after;
        let job = self.store.enqueue(job).await?;
        Ok(job.job_id)
    }
}
