//! `Orchestrator`: the facade `chem-cli` drives directly (submit, cancel,
//! retry, status) and the source of the `TaskHandler`s a worker pool
//! registers to carry submission and polling through to completion
//! (spec §4.6).

use std::sync::Arc;

use chem_domain::constants::PREDICTION_POLL_INTERVAL_S;
use chem_domain::PredictionBatch;
use chem_persistence::{MoleculeStore, PredictionStore};
use chem_prediction::PredictionClient;
use chem_tasks::Scheduler;
use uuid::Uuid;

use crate::cancel::cancel;
use crate::error::OrchestratorError;
use crate::handlers::{PollPayload, PredictionPollHandler, PredictionSubmitHandler};
use crate::submission::{resubmit, submit};

pub struct Orchestrator {
    prediction_store: Arc<dyn PredictionStore>,
    molecule_store: Arc<dyn MoleculeStore>,
    client: Arc<PredictionClient>,
    scheduler: Arc<Scheduler>,
}

impl Orchestrator {
    pub fn new(prediction_store: Arc<dyn PredictionStore>,
               molecule_store: Arc<dyn MoleculeStore>,
               client: Arc<PredictionClient>,
               scheduler: Arc<Scheduler>)
               -> Self {
        Self { prediction_store, molecule_store, client, scheduler }
    }

    /// Submits molecules for prediction, shards as needed, and schedules a
    /// polling task per resulting batch. Returns every batch id created.
    pub async fn submit_batch(&self,
                               molecule_ids: Vec<Uuid>,
                               properties: Vec<String>,
                               created_by: Uuid)
                               -> Result<Vec<Uuid>, OrchestratorError> {
        let batch_ids =
            submit(self.prediction_store.as_ref(), &self.client, molecule_ids, properties, created_by).await?;
        for batch_id in &batch_ids {
            let payload = serde_json::to_value(PollPayload { batch_id: *batch_id }).expect("PollPayload serializes");
            self.scheduler.schedule_prediction_poll(payload, PREDICTION_POLL_INTERVAL_S).await?;
        }
        Ok(batch_ids)
    }

    pub async fn cancel_batch(&self, batch_id: Uuid) -> Result<(), OrchestratorError> {
        cancel(self.prediction_store.as_ref(), batch_id).await
    }

    /// Retry of a FAILED batch (spec §4.6): resets to `Pending`,
    /// re-submits, and re-enters polling.
    pub async fn retry_batch(&self, batch_id: Uuid) -> Result<(), OrchestratorError> {
        resubmit(self.prediction_store.as_ref(), &self.client, batch_id).await?;
        let payload = serde_json::to_value(PollPayload { batch_id }).expect("PollPayload serializes");
        self.scheduler.schedule_prediction_poll(payload, PREDICTION_POLL_INTERVAL_S).await?;
        Ok(())
    }

    pub async fn get_batch(&self, batch_id: Uuid) -> Result<PredictionBatch, OrchestratorError> {
        Ok(self.prediction_store.get_batch(batch_id).await?)
    }

    /// The two `TaskHandler`s a worker pool must register (under
    /// `JobKind::PredictionSubmit` and `JobKind::PredictionPoll`) to carry
    /// batches created via a task payload rather than `submit_batch`
    /// through to completion.
    pub fn task_handlers(&self) -> (PredictionSubmitHandler, PredictionPollHandler) {
        let submit_handler = PredictionSubmitHandler { prediction_store: Arc::clone(&self.prediction_store),
                                                        client: Arc::clone(&self.client),
                                                        scheduler: Arc::clone(&self.scheduler) };
        let poll_handler = PredictionPollHandler { prediction_store: Arc::clone(&self.prediction_store),
                                                    molecule_store: Arc::clone(&self.molecule_store),
                                                    client: Arc::clone(&self.client) };
        (submit_handler, poll_handler)
    }
}
