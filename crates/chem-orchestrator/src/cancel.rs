//! Cancellation (spec §4.6 "Cancellation"): forces a `Pending` or
//! `Processing` batch to `Failed` with a fixed message. Already-stored
//! results are left in place.
//!
//! The wire protocol (spec §6) exposes no cancel endpoint for the external
//! AI Engine, so "attempts upstream cancel (if supported)" degrades to a
//! logged no-op here; nothing upstream is actually reachable to cancel.

use chem_domain::BatchStatus;
use chem_persistence::PredictionStore;
use uuid::Uuid;

use crate::error::OrchestratorError;

const CANCELLED_MESSAGE: &str = "cancelled by user";

pub async fn cancel(prediction_store: &dyn PredictionStore, batch_id: Uuid) -> Result<(), OrchestratorError> {
    let batch = prediction_store.get_batch(batch_id).await?;
    match batch.status {
        BatchStatus::Pending | BatchStatus::Processing => {
            if let Some(external_job_id) = batch.external_job_id {
                log::info!("no upstream cancel endpoint available for external job {external_job_id}; \
                             forcing batch {batch_id} to failed locally");
            }
            prediction_store.set_batch_status(batch_id, BatchStatus::Failed, Some(CANCELLED_MESSAGE)).await?;
            Ok(())
        }
        BatchStatus::Completed | BatchStatus::Failed => Err(OrchestratorError::InvalidTransition { current: "terminal" }),
    }
}
