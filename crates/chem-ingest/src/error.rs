//! Ingestion-specific errors (spec §4.4, §7). Phase failures that are not
//! per-row (file too large, bad mapping) stop the pipeline outright; per-row
//! problems are collected into `RowError`s instead of raised here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file exceeds the {limit_mb} MB size limit")]
    FileTooLarge { limit_mb: u64 },

    #[error("content is not valid CSV: {0}")]
    InvalidCsvFormat(String),

    #[error("CSV has {rows} rows, exceeding the {limit} row limit")]
    TooManyRows { rows: usize, limit: usize },

    #[error("column mapping references unknown CSV column '{0}'")]
    UnknownCsvColumn(String),

    #[error("column mapping does not map any column to 'smiles'")]
    MissingSmilesMapping,

    #[error("column mapping target '{0}' is not a known property and does not start with 'custom_'")]
    InvalidMappingTarget(String),

    #[error("CSV column '{0}' is mapped more than once")]
    DuplicateCsvColumn(String),

    #[error("persistence error: {0}")]
    Persistence(#[from] chem_persistence::PersistenceError),

    #[error("blob store error: {0}")]
    BlobStore(String),

    #[error("enrichment submission failed: {0}")]
    Enrichment(String),
}

impl IngestError {
    /// Promotes this error to the stable cross-boundary taxonomy (spec §7).
    pub fn to_core_error(&self) -> chem_domain::CoreError {
        use chem_domain::ErrorKind;
        match self {
            IngestError::FileTooLarge { .. } => chem_domain::CoreError::new(ErrorKind::FileTooLarge, self.to_string()),
            IngestError::InvalidCsvFormat(_) => chem_domain::CoreError::new(ErrorKind::InvalidCsvFormat, self.to_string()),
            IngestError::TooManyRows { .. } => chem_domain::CoreError::new(ErrorKind::TooManyRows, self.to_string()),
            IngestError::UnknownCsvColumn(_)
            | IngestError::MissingSmilesMapping
            | IngestError::InvalidMappingTarget(_)
            | IngestError::DuplicateCsvColumn(_) => {
                chem_domain::CoreError::new(ErrorKind::InvalidColumnMapping, self.to_string())
            }
            IngestError::Persistence(e) => e.to_core_error(),
            IngestError::BlobStore(_) | IngestError::Enrichment(_) => {
                chem_domain::CoreError::new(ErrorKind::UnexpectedError, self.to_string())
            }
        }
    }
}
