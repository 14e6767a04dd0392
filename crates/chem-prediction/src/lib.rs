//! chem-prediction
//!
//! The Prediction Client (C5): a typed, resilient HTTP client to the
//! external AI prediction engine (spec §4.5). Retries connection failures
//! with exponential backoff, trips a circuit breaker after repeated
//! failures, and maps HTTP status codes onto a typed error enum.

pub mod circuit_breaker;
pub mod client;
pub mod error;
pub mod models;

pub use client::{PredictionClient, PredictionClientConfig, DEFAULT_HEALTH_TIMEOUT_S, DEFAULT_MAX_WAIT_S, DEFAULT_POLL_INTERVAL_S,
                  DEFAULT_TIMEOUT_S};
pub use error::PredictionError;
pub use models::{
    AiModelInfo, BatchPredictionRequest, BatchPredictionResponse, MoleculePrediction, PredictionJobStatus, PredictionRequest,
    PredictionResponse, PropertyPrediction,
};
