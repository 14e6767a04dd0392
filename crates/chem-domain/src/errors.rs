//! Error taxonomy shared across the core (spec §7).
//!
//! Every component that crosses a boundary (store, ingestion, prediction
//! client, orchestrator) returns `CoreError` so that callers get a stable
//! `kind()` plus a human message and an optional detail bag, instead of a
//! component-specific exception type.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Stable machine-readable error kind (spec §7). Variant names double as the
/// wire-stable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidSmiles,
    InvalidCsvFormat,
    FileTooLarge,
    TooManyRows,
    MissingRequiredColumn,
    InvalidColumnMapping,
    InvalidPropertyValue,
    InvalidPredictionParameters,
    UnsupportedProperty,
    MoleculeNotFound,
    LibraryNotFound,
    PredictionJobNotFound,
    DuplicateMolecule,
    DuplicateLibraryName,
    ConnectionFailed,
    Timeout,
    ServiceUnavailable,
    RateLimited,
    UpstreamError,
    DatabaseError,
    SerializationError,
    UnexpectedError,
}

impl ErrorKind {
    /// Whether retrying the call that produced this kind is ever worthwhile
    /// (spec §7 propagation policy: transient upstream errors retry).
    pub fn is_transient(&self) -> bool {
        matches!(self,
                 ErrorKind::ConnectionFailed
                 | ErrorKind::Timeout
                 | ErrorKind::ServiceUnavailable
                 | ErrorKind::RateLimited)
    }
}

/// A single user-visible failure: kind + message + optional contextual
/// detail bag (molecule id, row index, property name, upstream status).
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct CoreError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, Value>,
}

impl CoreError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), details: HashMap::new() }
    }

    pub fn with_detail(mut self, key: &str, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.details.insert(key.to_string(), v);
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Errors raised directly by domain-level validation (entity construction,
/// invariant checks) before they are promoted to a `CoreError` at a
/// component boundary.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("external error: {0}")]
    ExternalError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::SerializationError(e.to_string())
    }
}

impl From<DomainError> for CoreError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::ValidationError(msg) => CoreError::new(ErrorKind::InvalidPropertyValue, msg),
            DomainError::ExternalError(msg) => CoreError::new(ErrorKind::UnexpectedError, msg),
            DomainError::SerializationError(msg) => CoreError::new(ErrorKind::SerializationError, msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_kinds_match_spec() {
        assert!(ErrorKind::Timeout.is_transient());
        assert!(ErrorKind::RateLimited.is_transient());
        assert!(!ErrorKind::InvalidSmiles.is_transient());
    }

    #[test]
    fn detail_bag_round_trips() {
        let err = CoreError::new(ErrorKind::InvalidSmiles, "empty smiles").with_detail("row", 3usize);
        assert_eq!(err.details.get("row").and_then(|v| v.as_u64()), Some(3));
    }
}
