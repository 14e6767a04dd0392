//! Prediction Client error taxonomy (spec §4.5, §7), grounded on
//! `original_source/integrations/ai_engine/exceptions.py` and the HTTP
//! status mapping in `client.py`'s `validate_api_response`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("prediction parameters are invalid: {0}")]
    InvalidPredictionParameters(String),

    #[error("prediction job '{0}' was not found")]
    PredictionJobNotFound(String),

    #[error("property '{0}' is not in the predictable set")]
    UnsupportedProperty(String),

    #[error("batch size {batch_size} exceeds the maximum of {max_batch_size}")]
    BatchSizeExceeded { batch_size: usize, max_batch_size: usize },

    #[error("AI Engine rate limit exceeded")]
    RateLimited,

    #[error("AI Engine is currently unavailable")]
    ServiceUnavailable,

    #[error("request to AI Engine timed out after {0}s")]
    Timeout(u64),

    #[error("failed to connect to AI Engine: {0}")]
    ConnectionFailed(String),

    #[error("AI Engine returned HTTP {status}: {body}")]
    UpstreamError { status: u16, body: String },

    #[error("prediction job '{0}' did not complete within {1}s")]
    WaitTimeout(String, u64),

    #[error("prediction job '{0}' failed upstream")]
    JobFailed(String),

    #[error("response body could not be parsed: {0}")]
    MalformedResponse(String),
}

impl PredictionError {
    /// Whether retrying the same request is expected to help (spec §4.5
    /// retry policy: connection failures and 5xx/429 responses are
    /// retried, 4xx validation errors are not).
    pub fn is_transient(&self) -> bool {
        matches!(self,
                 PredictionError::RateLimited
                 | PredictionError::ServiceUnavailable
                 | PredictionError::Timeout(_)
                 | PredictionError::ConnectionFailed(_))
    }

    /// Promotes this error to the stable cross-boundary taxonomy (spec §7).
    pub fn to_core_error(&self) -> chem_domain::CoreError {
        use chem_domain::ErrorKind;
        let kind = match self {
            PredictionError::InvalidPredictionParameters(_) | PredictionError::BatchSizeExceeded { .. } => {
                ErrorKind::InvalidPredictionParameters
            }
            PredictionError::PredictionJobNotFound(_) => ErrorKind::PredictionJobNotFound,
            PredictionError::UnsupportedProperty(_) => ErrorKind::UnsupportedProperty,
            PredictionError::RateLimited => ErrorKind::RateLimited,
            PredictionError::ServiceUnavailable => ErrorKind::ServiceUnavailable,
            PredictionError::Timeout(_) | PredictionError::WaitTimeout(_, _) => ErrorKind::Timeout,
            PredictionError::ConnectionFailed(_) => ErrorKind::ConnectionFailed,
            PredictionError::UpstreamError { .. } | PredictionError::JobFailed(_) => ErrorKind::UpstreamError,
            PredictionError::MalformedResponse(_) => ErrorKind::SerializationError,
        };
        chem_domain::CoreError::new(kind, self.to_string())
    }

    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            400 => PredictionError::InvalidPredictionParameters(body),
            404 => PredictionError::PredictionJobNotFound(body),
            429 => PredictionError::RateLimited,
            503 => PredictionError::ServiceUnavailable,
            _ => PredictionError::UpstreamError { status, body },
        }
    }
}
