//! Batch submission (spec §4.6 "Submission"): validates the requested
//! properties, shards oversized requests, persists a `PredictionBatch` per
//! shard, and hands each to the Prediction Client.

use chem_domain::constants::{is_predictable, MAX_PREDICTION_BATCH_SIZE};
use chem_domain::{BatchStatus, PredictionBatch};
use chem_persistence::PredictionStore;
use chem_prediction::models::{BatchPredictionRequest, DEFAULT_MODEL_NAME, DEFAULT_MODEL_VERSION};
use chem_prediction::PredictionClient;
use uuid::Uuid;

use crate::error::OrchestratorError;

/// Splits `molecule_ids` into batches of at most `MAX_PREDICTION_BATCH_SIZE`
/// and submits one `PredictionBatch` per shard, leaving each in `Pending`
/// or `Processing` depending on whether submission to C5 succeeded.
pub async fn submit(prediction_store: &dyn PredictionStore,
                     client: &PredictionClient,
                     molecule_ids: Vec<Uuid>,
                     properties: Vec<String>,
                     created_by: Uuid)
                     -> Result<Vec<Uuid>, OrchestratorError> {
    if molecule_ids.is_empty() {
        return Err(OrchestratorError::EmptyMoleculeList);
    }
    for property in &properties {
        if !is_predictable(property) {
            return Err(OrchestratorError::UnsupportedProperty(property.clone()));
        }
    }

    let mut batch_ids = Vec::new();
    for shard in molecule_ids.chunks(MAX_PREDICTION_BATCH_SIZE) {
        let batch_id = submit_one_shard(prediction_store, client, shard.to_vec(), properties.clone(), created_by).await?;
        batch_ids.push(batch_id);
    }
    Ok(batch_ids)
}

async fn submit_one_shard(prediction_store: &dyn PredictionStore,
                           client: &PredictionClient,
                           molecule_ids: Vec<Uuid>,
                           properties: Vec<String>,
                           created_by: Uuid)
                           -> Result<Uuid, OrchestratorError> {
    let now = chrono::Utc::now();
    let batch = PredictionBatch::new(Uuid::new_v4(),
                                      molecule_ids.clone(),
                                      properties.clone(),
                                      DEFAULT_MODEL_NAME,
                                      DEFAULT_MODEL_VERSION,
                                      created_by,
                                      now);
    let batch = prediction_store.create_batch(batch).await?;

    let request = BatchPredictionRequest { molecule_ids, properties, model_name: None, model_version: None, options: None };
    match client.submit_batch_prediction(request).await {
        Ok(response) => {
            let external_job_id = response.job_id
                                           .as_deref()
                                           .and_then(|id| Uuid::parse_str(id).ok())
                                           .unwrap_or(batch.id);
            prediction_store.attach_external_job(batch.id, external_job_id).await?;
            Ok(batch.id)
        }
        Err(e) => {
            prediction_store.set_batch_status(batch.id, BatchStatus::Failed, Some(&e.to_string())).await?;
            Err(e.into())
        }
    }
}

/// Re-submission for a retried `FAILED` batch (spec §4.6 "Retry of a FAILED
/// batch"): resets to `Pending` and re-enters the same submission path
/// using the batch's already-persisted molecule ids and properties.
/// Already-completed per-molecule predictions are left untouched; the
/// downstream polling step upserts predictions idempotently.
pub async fn resubmit(prediction_store: &dyn PredictionStore,
                       client: &PredictionClient,
                       batch_id: Uuid)
                       -> Result<(), OrchestratorError> {
    let batch = prediction_store.get_batch(batch_id).await?;
    if batch.status != BatchStatus::Failed {
        return Err(OrchestratorError::InvalidTransition { current: "not-failed" });
    }
    prediction_store.set_batch_status(batch_id, BatchStatus::Pending, None).await?;

    let request = BatchPredictionRequest { molecule_ids: batch.molecule_ids.clone(),
                                            properties: batch.properties.clone(),
                                            model_name: None,
                                            model_version: None,
                                            options: None };
    match client.submit_batch_prediction(request).await {
        Ok(response) => {
            let external_job_id =
                response.job_id.as_deref().and_then(|id| Uuid::parse_str(id).ok()).unwrap_or(batch.id);
            prediction_store.attach_external_job(batch.id, external_job_id).await?;
            Ok(())
        }
        Err(e) => {
            prediction_store.set_batch_status(batch.id, BatchStatus::Failed, Some(&e.to_string())).await?;
            Err(e.into())
        }
    }
}
