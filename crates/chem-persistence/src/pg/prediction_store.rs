//! Persisted state for the Prediction Orchestrator (C6, spec §4.6). Holds
//! `PredictionBatch` rows and the individual `Prediction` rows each batch's
//! polling step fans out into. The state-machine guards themselves live in
//! `chem-orchestrator`; this store only persists whatever status it is told.

use async_trait::async_trait;
use chem_domain::{BatchStatus, Prediction, PredictionBatch};
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::rows::{batch_status_str, prediction_status_str, PredictionBatchRow, PredictionRow};
use crate::PgPool;

#[async_trait]
pub trait PredictionStore: Send + Sync {
    async fn create_batch(&self, batch: PredictionBatch) -> Result<PredictionBatch, PersistenceError>;

    async fn get_batch(&self, id: Uuid) -> Result<PredictionBatch, PersistenceError>;

    /// Persists an `external_job_id` and moves `status` in one statement,
    /// matching the `Pending -> Processing` submission guard.
    async fn attach_external_job(&self, id: Uuid, external_job_id: Uuid) -> Result<PredictionBatch, PersistenceError>;

    async fn set_batch_status(&self, id: Uuid, status: BatchStatus, error_message: Option<&str>)
                               -> Result<PredictionBatch, PersistenceError>;

    async fn increment_batch_progress(&self, id: Uuid, completed_delta: u64, failed_delta: u64)
                                       -> Result<PredictionBatch, PersistenceError>;

    async fn upsert_prediction(&self, prediction: Prediction) -> Result<Prediction, PersistenceError>;

    async fn get_prediction(&self,
                             molecule_id: Uuid,
                             property_name: &str,
                             model_name: &str)
                             -> Result<Prediction, PersistenceError>;
}

pub struct PgPredictionStore {
    pool: PgPool,
}

impl PgPredictionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BATCH_COLUMNS: &str = "id, molecule_ids, properties, model_name, model_version, status, external_job_id, \
                              total_count, completed_count, failed_count, error_message, created_by, created_at, \
                              updated_at";

#[async_trait]
impl PredictionStore for PgPredictionStore {
    async fn create_batch(&self, batch: PredictionBatch) -> Result<PredictionBatch, PersistenceError> {
        let molecule_ids = serde_json::to_value(&batch.molecule_ids).map_err(|e| PersistenceError::Unknown(e.to_string()))?;
        let properties = serde_json::to_value(&batch.properties).map_err(|e| PersistenceError::Unknown(e.to_string()))?;
        let row: PredictionBatchRow = sqlx::query_as(&format!(
            "INSERT INTO prediction_batch (id, molecule_ids, properties, model_name, model_version, status, \
                                            external_job_id, total_count, completed_count, failed_count, \
                                            error_message, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {BATCH_COLUMNS}"
        )).bind(batch.id)
          .bind(molecule_ids)
          .bind(properties)
          .bind(&batch.model_name)
          .bind(&batch.model_version)
          .bind(batch_status_str(batch.status))
          .bind(batch.external_job_id)
          .bind(batch.total_count as i64)
          .bind(batch.completed_count as i64)
          .bind(batch.failed_count as i64)
          .bind(&batch.error_message)
          .bind(batch.created_by)
          .fetch_one(&self.pool)
          .await?;
        PredictionBatch::try_from(row)
    }

    async fn get_batch(&self, id: Uuid) -> Result<PredictionBatch, PersistenceError> {
        let row: PredictionBatchRow =
            sqlx::query_as(&format!("SELECT {BATCH_COLUMNS} FROM prediction_batch WHERE id = $1")).bind(id)
                                                                                                     .fetch_one(&self.pool)
                                                                                                     .await?;
        PredictionBatch::try_from(row)
    }

    async fn attach_external_job(&self,
                                  id: Uuid,
                                  external_job_id: Uuid)
                                  -> Result<PredictionBatch, PersistenceError> {
        let row: PredictionBatchRow = sqlx::query_as(&format!(
            "UPDATE prediction_batch SET external_job_id = $2, status = 'processing', updated_at = now() \
             WHERE id = $1 AND status = 'pending' RETURNING {BATCH_COLUMNS}"
        )).bind(id)
          .bind(external_job_id)
          .fetch_one(&self.pool)
          .await?;
        PredictionBatch::try_from(row)
    }

    async fn set_batch_status(&self,
                               id: Uuid,
                               status: BatchStatus,
                               error_message: Option<&str>)
                               -> Result<PredictionBatch, PersistenceError> {
        // Guarded the same way `attach_external_job` guards `Pending ->
        // Processing`: the predecessor statuses allowed to land on `status`
        // (spec §4.6 state diagram, `BatchStatus::allowed_transition`) are
        // folded into the `WHERE` clause itself, so an out-of-order update
        // matches zero rows instead of silently applying.
        let allowed_from: Vec<&'static str> =
            [BatchStatus::Pending, BatchStatus::Processing, BatchStatus::Completed, BatchStatus::Failed].into_iter()
                                                                                                          .filter(|&from| {
                                                                                                              BatchStatus::allowed_transition(from, status)
                                                                                                          })
                                                                                                          .map(batch_status_str)
                                                                                                          .collect();
        if allowed_from.is_empty() {
            return Err(PersistenceError::CheckViolation(format!("no status can transition into {status:?}")));
        }
        let in_list = allowed_from.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(", ");
        let row: PredictionBatchRow = sqlx::query_as(&format!(
            "UPDATE prediction_batch SET status = $2, error_message = $3, updated_at = now() \
             WHERE id = $1 AND status IN ({in_list}) RETURNING {BATCH_COLUMNS}"
        )).bind(id)
          .bind(batch_status_str(status))
          .bind(error_message)
          .fetch_one(&self.pool)
          .await?;
        PredictionBatch::try_from(row)
    }

    async fn increment_batch_progress(&self,
                                       id: Uuid,
                                       completed_delta: u64,
                                       failed_delta: u64)
                                       -> Result<PredictionBatch, PersistenceError> {
        let row: PredictionBatchRow = sqlx::query_as(&format!(
            "UPDATE prediction_batch SET completed_count = completed_count + $2, \
                                          failed_count = failed_count + $3, updated_at = now() \
             WHERE id = $1 RETURNING {BATCH_COLUMNS}"
        )).bind(id)
          .bind(completed_delta as i64)
          .bind(failed_delta as i64)
          .fetch_one(&self.pool)
          .await?;
        PredictionBatch::try_from(row)
    }

    async fn upsert_prediction(&self, prediction: Prediction) -> Result<Prediction, PersistenceError> {
        let value = match &prediction.value {
            Some(v) => Some(serde_json::to_value(v).map_err(|e| PersistenceError::Unknown(e.to_string()))?),
            None => None,
        };
        let row: PredictionRow = sqlx::query_as(
            "INSERT INTO prediction (id, molecule_id, property_name, value, confidence, units, model_name, \
                                      model_version, status, error_message) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (molecule_id, property_name, model_name, model_version) DO UPDATE \
                SET value = EXCLUDED.value, confidence = EXCLUDED.confidence, units = EXCLUDED.units, \
                    status = EXCLUDED.status, error_message = EXCLUDED.error_message, updated_at = now() \
             RETURNING id, molecule_id, property_name, value, confidence, units, model_name, model_version, \
                       status, error_message, created_at, updated_at",
        ).bind(prediction.id)
         .bind(prediction.molecule_id)
         .bind(&prediction.property_name)
         .bind(value)
         .bind(prediction.confidence)
         .bind(&prediction.units)
         .bind(&prediction.model_name)
         .bind(&prediction.model_version)
         .bind(prediction_status_str(prediction.status))
         .bind(&prediction.error_message)
         .fetch_one(&self.pool)
         .await?;
        Prediction::try_from(row)
    }

    async fn get_prediction(&self,
                             molecule_id: Uuid,
                             property_name: &str,
                             model_name: &str)
                             -> Result<Prediction, PersistenceError> {
        let row: PredictionRow = sqlx::query_as(
            "SELECT id, molecule_id, property_name, value, confidence, units, model_name, model_version, \
                    status, error_message, created_at, updated_at \
             FROM prediction WHERE molecule_id = $1 AND property_name = $2 AND model_name = $3 \
             ORDER BY updated_at DESC LIMIT 1",
        ).bind(molecule_id)
         .bind(property_name)
         .bind(model_name)
         .fetch_one(&self.pool)
         .await?;
        Prediction::try_from(row)
    }
}
