//! Top-level CLI error, folding every crate's error taxonomy down to the
//! three exit codes spec §6 defines: 0 success, 1 recoverable (bad input),
//! 2 internal. Every crate error is first promoted to a `CoreError` (spec
//! §7's stable `kind`), so the exit-code decision is made in one place
//! against that shared taxonomy rather than duplicated per crate.

use chem_domain::ErrorKind;
use chem_engine::EngineError;
use chem_ingest::IngestError;
use chem_orchestrator::OrchestratorError;
use chem_persistence::PersistenceError;
use chem_prediction::PredictionError;
use chem_tasks::TaskError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Argument or file-system problems caught before any crate-level call.
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error(transparent)]
    Task(#[from] TaskError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 1,
            CliError::Engine(e) => kind_exit_code(e.to_core_error().kind()),
            CliError::Ingest(e) => kind_exit_code(e.to_core_error().kind()),
            CliError::Persistence(e) => kind_exit_code(e.to_core_error().kind()),
            CliError::Prediction(e) => kind_exit_code(e.to_core_error().kind()),
            CliError::Orchestrator(e) => kind_exit_code(e.to_core_error().kind()),
            CliError::Task(e) => kind_exit_code(e.to_core_error().kind()),
        }
    }
}

/// Input, not-found, and conflict kinds are recoverable by fixing the
/// request; upstream and internal kinds are not (spec §6 exit codes, §7
/// taxonomy).
fn kind_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::InvalidSmiles
        | ErrorKind::InvalidCsvFormat
        | ErrorKind::FileTooLarge
        | ErrorKind::TooManyRows
        | ErrorKind::MissingRequiredColumn
        | ErrorKind::InvalidColumnMapping
        | ErrorKind::InvalidPropertyValue
        | ErrorKind::InvalidPredictionParameters
        | ErrorKind::UnsupportedProperty
        | ErrorKind::MoleculeNotFound
        | ErrorKind::LibraryNotFound
        | ErrorKind::PredictionJobNotFound => 1,
        ErrorKind::DuplicateMolecule
        | ErrorKind::DuplicateLibraryName
        | ErrorKind::ConnectionFailed
        | ErrorKind::Timeout
        | ErrorKind::ServiceUnavailable
        | ErrorKind::RateLimited
        | ErrorKind::UpstreamError
        | ErrorKind::DatabaseError
        | ErrorKind::SerializationError
        | ErrorKind::UnexpectedError => 2,
    }
}
