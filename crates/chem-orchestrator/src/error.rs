//! Orchestrator-specific errors (spec §4.6).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("batch requests property '{0}' which is not in the predictable set")]
    UnsupportedProperty(String),

    #[error("batch has no molecules to predict for")]
    EmptyMoleculeList,

    #[error("batch is in status '{current}', which does not allow this operation")]
    InvalidTransition { current: &'static str },

    #[error("prediction client error: {0}")]
    Prediction(#[from] chem_prediction::PredictionError),

    #[error("persistence error: {0}")]
    Persistence(#[from] chem_persistence::PersistenceError),

    #[error("task scheduling error: {0}")]
    Task(#[from] chem_tasks::TaskError),
}

impl OrchestratorError {
    /// Promotes this error to the stable cross-boundary taxonomy (spec §7).
    pub fn to_core_error(&self) -> chem_domain::CoreError {
        use chem_domain::ErrorKind;
        match self {
            OrchestratorError::UnsupportedProperty(_) => {
                chem_domain::CoreError::new(ErrorKind::UnsupportedProperty, self.to_string())
            }
            OrchestratorError::EmptyMoleculeList | OrchestratorError::InvalidTransition { .. } => {
                chem_domain::CoreError::new(ErrorKind::InvalidPredictionParameters, self.to_string())
            }
            OrchestratorError::Prediction(e) => e.to_core_error(),
            OrchestratorError::Persistence(e) => e.to_core_error(),
            OrchestratorError::Task(e) => e.to_core_error(),
        }
    }
}
