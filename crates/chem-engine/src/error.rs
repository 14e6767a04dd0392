//! Structure Engine error taxonomy (spec §4.1, §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid SMILES: {0}")]
    InvalidSmiles(String),

    #[error("sanitization failed for '{0}'")]
    SanitizationFailed(String),

    #[error("python runtime error: {0}")]
    PythonRuntimeError(String),

    #[error("unsupported fingerprint type: {0}")]
    UnsupportedFingerprintType(String),

    #[error("unsupported similarity metric: {0}")]
    UnsupportedMetric(String),
}

impl From<pyo3::PyErr> for EngineError {
    fn from(err: pyo3::PyErr) -> Self {
        EngineError::PythonRuntimeError(err.to_string())
    }
}

impl EngineError {
    /// Promotes this error to the stable cross-boundary taxonomy (spec §7).
    pub fn to_core_error(&self) -> chem_domain::CoreError {
        use chem_domain::ErrorKind;
        let kind = match self {
            EngineError::InvalidSmiles(_) | EngineError::SanitizationFailed(_) => ErrorKind::InvalidSmiles,
            EngineError::UnsupportedFingerprintType(_) | EngineError::UnsupportedMetric(_) => {
                ErrorKind::InvalidPredictionParameters
            }
            EngineError::PythonRuntimeError(_) => ErrorKind::UnexpectedError,
        };
        chem_domain::CoreError::new(kind, self.to_string())
    }
}
