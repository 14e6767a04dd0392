//! `chem-tasks::TaskHandler` implementations that drive batches through
//! the submission and polling steps from a worker pool (spec §4.6, §4.7).

use std::sync::Arc;

use async_trait::async_trait;
use chem_domain::constants::PREDICTION_POLL_INTERVAL_S;
use chem_domain::JobKind;
use chem_persistence::{MoleculeStore, PredictionStore};
use chem_prediction::PredictionClient;
use chem_tasks::{Scheduler, TaskContext, TaskError, TaskHandler, TaskOutcome};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::poll::{poll, PollOutcome};
use crate::submission::{resubmit, submit};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmitPayload {
    New { molecule_ids: Vec<Uuid>, properties: Vec<String>, created_by: Uuid },
    Retry { batch_id: Uuid },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PollPayload {
    pub batch_id: Uuid,
}

pub struct PredictionSubmitHandler {
    pub prediction_store: Arc<dyn PredictionStore>,
    pub client: Arc<PredictionClient>,
    pub scheduler: Arc<Scheduler>,
}

#[async_trait]
impl TaskHandler for PredictionSubmitHandler {
    fn kind(&self) -> JobKind {
        JobKind::PredictionSubmit
    }

    async fn run(&self, _ctx: &TaskContext, payload: serde_json::Value) -> Result<TaskOutcome, TaskError> {
        let payload: SubmitPayload =
            serde_json::from_value(payload).map_err(|e| TaskError::MalformedPayload(e.to_string()))?;

        let batch_ids = match payload {
            SubmitPayload::New { molecule_ids, properties, created_by } => {
                submit(self.prediction_store.as_ref(), &self.client, molecule_ids, properties, created_by)
                    .await
                    .map_err(|e| TaskError::HandlerFailed(e.to_string()))?
            }
            SubmitPayload::Retry { batch_id } => {
                resubmit(self.prediction_store.as_ref(), &self.client, batch_id).await
                                                                                 .map_err(|e| TaskError::HandlerFailed(e.to_string()))?;
                vec![batch_id]
            }
        };

        for batch_id in batch_ids {
            let poll_payload = serde_json::to_value(PollPayload { batch_id }).expect("PollPayload serializes");
            self.scheduler.schedule_prediction_poll(poll_payload, PREDICTION_POLL_INTERVAL_S).await?;
        }
        Ok(TaskOutcome::Completed)
    }
}

pub struct PredictionPollHandler {
    pub prediction_store: Arc<dyn PredictionStore>,
    pub molecule_store: Arc<dyn MoleculeStore>,
    pub client: Arc<PredictionClient>,
}

#[async_trait]
impl TaskHandler for PredictionPollHandler {
    fn kind(&self) -> JobKind {
        JobKind::PredictionPoll
    }

    async fn run(&self, ctx: &TaskContext, payload: serde_json::Value) -> Result<TaskOutcome, TaskError> {
        if ctx.should_abort() {
            return Err(TaskError::Cancelled);
        }
        let payload: PollPayload = serde_json::from_value(payload).map_err(|e| TaskError::MalformedPayload(e.to_string()))?;

        let outcome = poll(self.prediction_store.as_ref(), self.molecule_store.as_ref(), &self.client, payload.batch_id)
            .await
            .map_err(|e| TaskError::HandlerFailed(e.to_string()))?;

        match outcome {
            PollOutcome::StillProcessing => Ok(TaskOutcome::Reschedule { after_s: PREDICTION_POLL_INTERVAL_S }),
            PollOutcome::Terminal(_) => Ok(TaskOutcome::Completed),
        }
    }
}
