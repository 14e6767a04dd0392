//! Polling step (spec §4.6 "Polling step"): checks the external job's
//! status, ingests results one (molecule, property) tuple at a time, and
//! reports what the caller (the `PredictionPoll` task handler) should do
//! next: keep polling, or stop because the batch reached a terminal state.

use chem_domain::{BatchStatus, Prediction, PredictionStatus, PropertySource, PropertyValue};
use chem_persistence::{MoleculeStore, PredictionStore};
use chem_prediction::PredictionClient;
use uuid::Uuid;

use crate::error::OrchestratorError;

pub enum PollOutcome {
    StillProcessing,
    Terminal(BatchStatus),
}

pub async fn poll(prediction_store: &dyn PredictionStore,
                   molecule_store: &dyn MoleculeStore,
                   client: &PredictionClient,
                   batch_id: Uuid)
                   -> Result<PollOutcome, OrchestratorError> {
    let batch = prediction_store.get_batch(batch_id).await?;
    if batch.status != BatchStatus::Processing {
        return Err(OrchestratorError::InvalidTransition { current: "not-processing" });
    }
    let external_job_id = match batch.external_job_id {
        Some(id) => id,
        None => {
            prediction_store.set_batch_status(batch_id, BatchStatus::Failed, Some("missing external_job_id")).await?;
            return Ok(PollOutcome::Terminal(BatchStatus::Failed));
        }
    };

    let status = client.get_batch_prediction_status(external_job_id).await?;
    match status.status.as_str() {
        "processing" | "pending" => Ok(PollOutcome::StillProcessing),
        "completed" => {
            let job_id = status.job_id.unwrap_or_else(|| external_job_id.to_string());
            let results = client.get_prediction_results(&job_id).await?;
            ingest_results(prediction_store, molecule_store, &batch, &results).await
        }
        "failed" => {
            prediction_store.set_batch_status(batch_id, BatchStatus::Failed, Some("upstream job failed")).await?;
            Ok(PollOutcome::Terminal(BatchStatus::Failed))
        }
        other => {
            let message = format!("unrecognized upstream status '{other}'");
            prediction_store.set_batch_status(batch_id, BatchStatus::Failed, Some(&message)).await?;
            Ok(PollOutcome::Terminal(BatchStatus::Failed))
        }
    }
}

async fn ingest_results(prediction_store: &dyn PredictionStore,
                         molecule_store: &dyn MoleculeStore,
                         batch: &chem_domain::PredictionBatch,
                         results: &chem_prediction::models::PredictionResponse)
                         -> Result<PollOutcome, OrchestratorError> {
    let mut completed_delta = 0u64;
    let mut failed_delta = 0u64;

    let molecule_predictions = results.results.as_deref().unwrap_or(&[]);
    for molecule_prediction in molecule_predictions {
        let molecule = match molecule_store.get_by_smiles(&molecule_prediction.smiles).await {
            Ok(m) => m,
            Err(e) => {
                log::warn!("prediction result for unknown molecule '{}': {e}", molecule_prediction.smiles);
                failed_delta += batch.properties.len() as u64;
                continue;
            }
        };

        if let Some(error) = &molecule_prediction.error {
            log::warn!("prediction failed for molecule {}: {error}", molecule.id);
            failed_delta += molecule_prediction.properties.len().max(batch.properties.len()) as u64;
            continue;
        }

        for (property_name, prediction) in &molecule_prediction.properties {
            let value: Option<PropertyValue> = serde_json::from_value(prediction.value.clone()).ok();
            let now = chrono::Utc::now();
            let record = Prediction { id: Uuid::new_v4(),
                                       molecule_id: molecule.id,
                                       property_name: property_name.clone(),
                                       value: value.clone(),
                                       confidence: Some(prediction.confidence),
                                       units: prediction.units.clone(),
                                       model_name: batch.model_name.clone(),
                                       model_version: batch.model_version.clone(),
                                       status: PredictionStatus::Completed,
                                       error_message: None,
                                       created_at: now,
                                       updated_at: now };
            prediction_store.upsert_prediction(record).await?;

            match value {
                Some(value) => {
                    molecule_store.set_property(molecule.id,
                                                 property_name,
                                                 value,
                                                 PropertySource::Predicted,
                                                 prediction.units.clone(),
                                                 Some(prediction.confidence))
                                  .await?;
                    completed_delta += 1;
                }
                None => failed_delta += 1,
            }
        }
    }

    let updated = prediction_store.increment_batch_progress(batch.id, completed_delta, failed_delta).await?;
    if updated.completed_count + updated.failed_count >= updated.total_count {
        let final_status = if updated.completed_count > 0 { BatchStatus::Completed } else { BatchStatus::Failed };
        prediction_store.set_batch_status(batch.id, final_status, None).await?;
        Ok(PollOutcome::Terminal(final_status))
    } else {
        Ok(PollOutcome::StillProcessing)
    }
}
