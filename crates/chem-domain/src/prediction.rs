//! `Prediction` and `PredictionBatch` (spec §3, §4.6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::property::PropertyValue;

/// Per-(molecule, property) prediction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// A single predicted property value for a molecule (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: Uuid,
    pub molecule_id: Uuid,
    pub property_name: String,
    pub value: Option<PropertyValue>,
    pub confidence: Option<f64>,
    pub units: Option<String>,
    pub model_name: String,
    pub model_version: String,
    pub status: PredictionStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `PredictionBatch` lifecycle state (spec §4.6). Transitions are the only
/// way `status` may change; see `chem-orchestrator` for the guarded state
/// machine that enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl BatchStatus {
    /// Whether `from -> self` is an allowed transition under the spec §4.6
    /// state diagram (`Pending -> Processing -> {Completed, Failed}`, with
    /// `Pending -> Failed` on submit error and retry resetting `Failed ->
    /// Pending`).
    pub fn allowed_transition(from: BatchStatus, to: BatchStatus) -> bool {
        matches!((from, to),
                 (BatchStatus::Pending, BatchStatus::Processing)
                 | (BatchStatus::Pending, BatchStatus::Failed)
                 | (BatchStatus::Processing, BatchStatus::Completed)
                 | (BatchStatus::Processing, BatchStatus::Failed)
                 | (BatchStatus::Failed, BatchStatus::Pending))
    }
}

/// Single orchestrated unit of external prediction work spanning multiple
/// molecules and properties (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionBatch {
    pub id: Uuid,
    pub molecule_ids: Vec<Uuid>,
    pub properties: Vec<String>,
    pub model_name: String,
    pub model_version: String,
    pub status: BatchStatus,
    pub external_job_id: Option<Uuid>,
    pub total_count: u64,
    pub completed_count: u64,
    pub failed_count: u64,
    pub error_message: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PredictionBatch {
    pub fn new(id: Uuid,
               molecule_ids: Vec<Uuid>,
               properties: Vec<String>,
               model_name: impl Into<String>,
               model_version: impl Into<String>,
               created_by: Uuid,
               now: DateTime<Utc>)
               -> Self {
        let total_count = (molecule_ids.len() * properties.len()) as u64;
        PredictionBatch { id,
                          molecule_ids,
                          properties,
                          model_name: model_name.into(),
                          model_version: model_version.into(),
                          status: BatchStatus::Pending,
                          external_job_id: None,
                          total_count,
                          completed_count: 0,
                          failed_count: 0,
                          error_message: None,
                          created_by,
                          created_at: now,
                          updated_at: now }
    }

    /// Invariant P6: `completed_count + failed_count <= total_count`, and
    /// equality implies terminal status.
    pub fn is_consistent(&self) -> bool {
        let sum = self.completed_count + self.failed_count;
        if sum > self.total_count {
            return false;
        }
        if sum == self.total_count {
            return matches!(self.status, BatchStatus::Completed | BatchStatus::Failed);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_machine_forbids_skipping_processing() {
        assert!(!BatchStatus::allowed_transition(BatchStatus::Pending, BatchStatus::Completed));
        assert!(BatchStatus::allowed_transition(BatchStatus::Pending, BatchStatus::Processing));
    }

    #[test]
    fn retry_resets_failed_to_pending() {
        assert!(BatchStatus::allowed_transition(BatchStatus::Failed, BatchStatus::Pending));
        assert!(!BatchStatus::allowed_transition(BatchStatus::Completed, BatchStatus::Pending));
    }

    #[test]
    fn consistency_requires_terminal_status_at_equality() {
        let mut batch = PredictionBatch::new(Uuid::new_v4(), vec![Uuid::new_v4()], vec!["logp".into()], "m", "v1", Uuid::new_v4(), Utc::now());
        batch.completed_count = 1;
        assert!(!batch.is_consistent());
        batch.status = BatchStatus::Completed;
        assert!(batch.is_consistent());
    }
}
