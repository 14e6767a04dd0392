//! Task Runtime errors (spec §4.7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("unknown queue '{0}'")]
    UnknownQueue(String),

    #[error("task handler failed: {0}")]
    HandlerFailed(String),

    #[error("task payload did not match the shape its handler expected: {0}")]
    MalformedPayload(String),

    #[error("job was cancelled")]
    Cancelled,

    #[error("persistence error: {0}")]
    Persistence(#[from] chem_persistence::PersistenceError),
}

impl TaskError {
    /// Promotes this error to the stable cross-boundary taxonomy (spec §7).
    pub fn to_core_error(&self) -> chem_domain::CoreError {
        use chem_domain::ErrorKind;
        match self {
            TaskError::MalformedPayload(_) => chem_domain::CoreError::new(ErrorKind::SerializationError, self.to_string()),
            TaskError::UnknownQueue(_) | TaskError::HandlerFailed(_) | TaskError::Cancelled => {
                chem_domain::CoreError::new(ErrorKind::UnexpectedError, self.to_string())
            }
            TaskError::Persistence(e) => e.to_core_error(),
        }
    }
}
