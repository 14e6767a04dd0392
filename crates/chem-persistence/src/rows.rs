//! `sqlx::FromRow` row shapes and their conversions to `chem_domain` types.
//! Kept separate from the repository methods so the wire shape of each table
//! is visible at a glance (spec §6 Persisted State Layout).

use chem_domain::{Fingerprint, FingerprintData, FingerprintParameters, FingerprintType, Job, JobKind, JobState, Library,
                   Molecule, MoleculeProperty, MoleculeStatus, Prediction, PredictionBatch, PredictionStatus, BatchStatus,
                   PropertySource, PropertyValue};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::PersistenceError;

#[derive(Debug, sqlx::FromRow)]
pub struct MoleculeRow {
    pub id: Uuid,
    pub smiles: String,
    pub inchi_key: String,
    pub formula: String,
    pub molecular_weight: f64,
    pub status: String,
    pub attributes: serde_json::Value,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<MoleculeRow> for Molecule {
    type Error = PersistenceError;

    fn try_from(row: MoleculeRow) -> Result<Self, Self::Error> {
        let status = match row.status.as_str() {
            "available" => MoleculeStatus::Available,
            "pending" => MoleculeStatus::Pending,
            "testing" => MoleculeStatus::Testing,
            "results" => MoleculeStatus::Results,
            "archived" => MoleculeStatus::Archived,
            other => return Err(PersistenceError::Unknown(format!("unrecognized molecule status '{other}'"))),
        };
        Ok(Molecule { id: row.id,
                       smiles: row.smiles,
                       inchi_key: row.inchi_key,
                       formula: row.formula,
                       molecular_weight: row.molecular_weight,
                       status,
                       attributes: row.attributes,
                       created_by: row.created_by,
                       created_at: row.created_at,
                       updated_at: row.updated_at })
    }
}

pub fn molecule_status_str(status: MoleculeStatus) -> &'static str {
    match status {
        MoleculeStatus::Available => "available",
        MoleculeStatus::Pending => "pending",
        MoleculeStatus::Testing => "testing",
        MoleculeStatus::Results => "results",
        MoleculeStatus::Archived => "archived",
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PropertyRow {
    pub molecule_id: Uuid,
    pub name: String,
    pub source: String,
    pub value: serde_json::Value,
    pub units: Option<String>,
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PropertyRow> for MoleculeProperty {
    type Error = PersistenceError;

    fn try_from(row: PropertyRow) -> Result<Self, Self::Error> {
        let source = property_source_from_str(&row.source)?;
        let value: PropertyValue =
            serde_json::from_value(row.value).map_err(|e| PersistenceError::Unknown(format!("bad property value json: {e}")))?;
        Ok(MoleculeProperty { molecule_id: row.molecule_id,
                               name: row.name,
                               source,
                               value,
                               units: row.units,
                               confidence: row.confidence,
                               created_at: row.created_at })
    }
}

pub fn property_source_str(source: PropertySource) -> &'static str {
    match source {
        PropertySource::Calculated => "calculated",
        PropertySource::Imported => "imported",
        PropertySource::Predicted => "predicted",
        PropertySource::Experimental => "experimental",
    }
}

pub fn property_source_from_str(s: &str) -> Result<PropertySource, PersistenceError> {
    match s {
        "calculated" => Ok(PropertySource::Calculated),
        "imported" => Ok(PropertySource::Imported),
        "predicted" => Ok(PropertySource::Predicted),
        "experimental" => Ok(PropertySource::Experimental),
        other => Err(PersistenceError::Unknown(format!("unrecognized property source '{other}'"))),
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct LibraryRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LibraryRow> for Library {
    fn from(row: LibraryRow) -> Self {
        Library { id: row.id,
                   name: row.name,
                   description: row.description,
                   owner_id: row.owner_id,
                   organization_id: row.organization_id,
                   is_public: row.is_public,
                   created_at: row.created_at,
                   updated_at: row.updated_at }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct FingerprintRow {
    pub molecule_id: Uuid,
    pub fingerprint_type: String,
    pub data: Option<Vec<u8>>,
    pub sparse_entries: Option<serde_json::Value>,
    pub parameters: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<FingerprintRow> for Fingerprint {
    type Error = PersistenceError;

    fn try_from(row: FingerprintRow) -> Result<Self, Self::Error> {
        let fingerprint_type = fingerprint_type_from_str(&row.fingerprint_type)?;
        let parameters: FingerprintParameters = serde_json::from_value(row.parameters)
            .map_err(|e| PersistenceError::Unknown(format!("bad fingerprint parameters json: {e}")))?;
        let data = match (row.data, row.sparse_entries) {
            (Some(bytes), _) => {
                let n_bits = (bytes.len() * 8) as u32;
                FingerprintData::Dense { n_bits, bytes }
            }
            (None, Some(entries_json)) => {
                let entries: Vec<(u32, u32)> = serde_json::from_value(entries_json)
                    .map_err(|e| PersistenceError::Unknown(format!("bad sparse fingerprint json: {e}")))?;
                FingerprintData::Sparse { entries }
            }
            (None, None) => return Err(PersistenceError::Unknown("fingerprint row has neither dense nor sparse data".into())),
        };
        Ok(Fingerprint { molecule_id: row.molecule_id, fingerprint_type, parameters, data, created_at: row.created_at })
    }
}

pub fn fingerprint_type_str(t: FingerprintType) -> &'static str {
    match t {
        FingerprintType::Morgan => "morgan",
        FingerprintType::Maccs => "maccs",
        FingerprintType::Rdkit => "rdkit",
        FingerprintType::Pattern => "pattern",
        FingerprintType::Layered => "layered",
        FingerprintType::AtomPairs => "atom_pairs",
        FingerprintType::Torsion => "torsion",
    }
}

pub fn fingerprint_type_from_str(s: &str) -> Result<FingerprintType, PersistenceError> {
    match s {
        "morgan" => Ok(FingerprintType::Morgan),
        "maccs" => Ok(FingerprintType::Maccs),
        "rdkit" => Ok(FingerprintType::Rdkit),
        "pattern" => Ok(FingerprintType::Pattern),
        "layered" => Ok(FingerprintType::Layered),
        "atom_pairs" => Ok(FingerprintType::AtomPairs),
        "torsion" => Ok(FingerprintType::Torsion),
        other => Err(PersistenceError::Unknown(format!("unrecognized fingerprint type '{other}'"))),
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PredictionRow {
    pub id: Uuid,
    pub molecule_id: Uuid,
    pub property_name: String,
    pub value: Option<serde_json::Value>,
    pub confidence: Option<f64>,
    pub units: Option<String>,
    pub model_name: String,
    pub model_version: String,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PredictionRow> for Prediction {
    type Error = PersistenceError;

    fn try_from(row: PredictionRow) -> Result<Self, Self::Error> {
        let status = prediction_status_from_str(&row.status)?;
        let value = row.value
                       .map(serde_json::from_value)
                       .transpose()
                       .map_err(|e| PersistenceError::Unknown(format!("bad prediction value json: {e}")))?;
        Ok(Prediction { id: row.id,
                         molecule_id: row.molecule_id,
                         property_name: row.property_name,
                         value,
                         confidence: row.confidence,
                         units: row.units,
                         model_name: row.model_name,
                         model_version: row.model_version,
                         status,
                         error_message: row.error_message,
                         created_at: row.created_at,
                         updated_at: row.updated_at })
    }
}

pub fn prediction_status_str(status: PredictionStatus) -> &'static str {
    match status {
        PredictionStatus::Pending => "pending",
        PredictionStatus::Processing => "processing",
        PredictionStatus::Completed => "completed",
        PredictionStatus::Failed => "failed",
    }
}

pub fn prediction_status_from_str(s: &str) -> Result<PredictionStatus, PersistenceError> {
    match s {
        "pending" => Ok(PredictionStatus::Pending),
        "processing" => Ok(PredictionStatus::Processing),
        "completed" => Ok(PredictionStatus::Completed),
        "failed" => Ok(PredictionStatus::Failed),
        other => Err(PersistenceError::Unknown(format!("unrecognized prediction status '{other}'"))),
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PredictionBatchRow {
    pub id: Uuid,
    pub molecule_ids: serde_json::Value,
    pub properties: serde_json::Value,
    pub model_name: String,
    pub model_version: String,
    pub status: String,
    pub external_job_id: Option<Uuid>,
    pub total_count: i64,
    pub completed_count: i64,
    pub failed_count: i64,
    pub error_message: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PredictionBatchRow> for PredictionBatch {
    type Error = PersistenceError;

    fn try_from(row: PredictionBatchRow) -> Result<Self, Self::Error> {
        let status = batch_status_from_str(&row.status)?;
        let molecule_ids: Vec<Uuid> = serde_json::from_value(row.molecule_ids)
            .map_err(|e| PersistenceError::Unknown(format!("bad molecule_ids json: {e}")))?;
        let properties: Vec<String> = serde_json::from_value(row.properties)
            .map_err(|e| PersistenceError::Unknown(format!("bad properties json: {e}")))?;
        Ok(PredictionBatch { id: row.id,
                               molecule_ids,
                               properties,
                               model_name: row.model_name,
                               model_version: row.model_version,
                               status,
                               external_job_id: row.external_job_id,
                               total_count: row.total_count as u64,
                               completed_count: row.completed_count as u64,
                               failed_count: row.failed_count as u64,
                               error_message: row.error_message,
                               created_by: row.created_by,
                               created_at: row.created_at,
                               updated_at: row.updated_at })
    }
}

pub fn batch_status_str(status: BatchStatus) -> &'static str {
    match status {
        BatchStatus::Pending => "pending",
        BatchStatus::Processing => "processing",
        BatchStatus::Completed => "completed",
        BatchStatus::Failed => "failed",
    }
}

pub fn batch_status_from_str(s: &str) -> Result<BatchStatus, PersistenceError> {
    match s {
        "pending" => Ok(BatchStatus::Pending),
        "processing" => Ok(BatchStatus::Processing),
        "completed" => Ok(BatchStatus::Completed),
        "failed" => Ok(BatchStatus::Failed),
        other => Err(PersistenceError::Unknown(format!("unrecognized batch status '{other}'"))),
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct JobRow {
    pub job_id: Uuid,
    pub kind: String,
    pub queue: String,
    pub state: String,
    pub total: i64,
    pub completed: i64,
    pub failed: i64,
    pub attempts: i32,
    pub max_attempts: i32,
    pub last_error: Option<String>,
    pub payload: serde_json::Value,
    pub run_after: DateTime<Utc>,
    pub cancel_requested: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = PersistenceError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job { job_id: row.job_id,
                  kind: job_kind_from_str(&row.kind)?,
                  queue: row.queue,
                  state: job_state_from_str(&row.state)?,
                  total: row.total as u64,
                  completed: row.completed as u64,
                  failed: row.failed as u64,
                  attempts: row.attempts as u32,
                  max_attempts: row.max_attempts as u32,
                  last_error: row.last_error,
                  payload: row.payload,
                  run_after: row.run_after,
                  cancel_requested: row.cancel_requested,
                  created_at: row.created_at,
                  updated_at: row.updated_at })
    }
}

pub fn job_kind_str(kind: &JobKind) -> &'static str {
    match kind {
        JobKind::CsvIngestion => "csv_ingestion",
        JobKind::PredictionSubmit => "prediction_submit",
        JobKind::PredictionPoll => "prediction_poll",
        JobKind::Cleanup => "cleanup",
    }
}

pub fn job_kind_from_str(s: &str) -> Result<JobKind, PersistenceError> {
    match s {
        "csv_ingestion" => Ok(JobKind::CsvIngestion),
        "prediction_submit" => Ok(JobKind::PredictionSubmit),
        "prediction_poll" => Ok(JobKind::PredictionPoll),
        "cleanup" => Ok(JobKind::Cleanup),
        other => Err(PersistenceError::Unknown(format!("unrecognized job kind '{other}'"))),
    }
}

pub fn job_state_str(state: JobState) -> &'static str {
    match state {
        JobState::Queued => "queued",
        JobState::Running => "running",
        JobState::Succeeded => "succeeded",
        JobState::Failed => "failed",
        JobState::Cancelled => "cancelled",
    }
}

pub fn job_state_from_str(s: &str) -> Result<JobState, PersistenceError> {
    match s {
        "queued" => Ok(JobState::Queued),
        "running" => Ok(JobState::Running),
        "succeeded" => Ok(JobState::Succeeded),
        "failed" => Ok(JobState::Failed),
        "cancelled" => Ok(JobState::Cancelled),
        other => Err(PersistenceError::Unknown(format!("unrecognized job state '{other}'"))),
    }
}
