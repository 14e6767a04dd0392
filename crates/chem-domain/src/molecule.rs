//! The `Molecule` entity (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// Lifecycle status of a molecule (spec §3, initial `Available`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoleculeStatus {
    Available,
    Pending,
    Testing,
    Results,
    Archived,
}

impl Default for MoleculeStatus {
    fn default() -> Self {
        MoleculeStatus::Available
    }
}

/// A de-duplicated chemical structure, keyed by `inchi_key` (invariant I1).
///
/// The reserved ORM attribute name `metadata` from the original source
/// collides with persistence-layer internals; renamed `attributes` here
/// while preserving the same JSON shape (spec §9, Open Questions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    pub id: Uuid,
    pub smiles: String,
    pub inchi_key: String,
    pub formula: String,
    pub molecular_weight: f64,
    pub status: MoleculeStatus,
    pub attributes: serde_json::Value,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Molecule {
    /// Builds a `Molecule` from already-computed structural identity.
    /// Callers are expected to have produced `inchi_key`/`formula` via the
    /// Structure Engine; this constructor only enforces the domain-level
    /// shape invariants (I1 uniqueness is enforced by the store, not here).
    #[allow(clippy::too_many_arguments)]
    pub fn new(id: Uuid,
               smiles: impl Into<String>,
               inchi_key: impl Into<String>,
               formula: impl Into<String>,
               molecular_weight: f64,
               created_by: Uuid,
               now: DateTime<Utc>)
               -> Result<Self, DomainError> {
        let smiles = smiles.into();
        let inchi_key = inchi_key.into();
        if smiles.trim().is_empty() {
            return Err(DomainError::ValidationError("smiles must not be empty".into()));
        }
        validate_inchi_key(&inchi_key)?;
        if molecular_weight < 0.0 {
            return Err(DomainError::ValidationError("molecular_weight must be non-negative".into()));
        }
        Ok(Molecule { id,
                      smiles,
                      inchi_key,
                      formula: formula.into(),
                      molecular_weight,
                      status: MoleculeStatus::Available,
                      attributes: serde_json::json!({}),
                      created_by,
                      created_at: now,
                      updated_at: now })
    }
}

/// Validates the structural shape of an InChI Key: 27 characters, two
/// hyphens, uppercase alphanumeric segments. Does not verify that the key
/// actually corresponds to any structure — that is the Structure Engine's
/// job.
pub fn validate_inchi_key(key: &str) -> Result<(), DomainError> {
    if key.len() != 27 {
        return Err(DomainError::ValidationError("inchi_key must be exactly 27 characters".into()));
    }
    let parts: Vec<&str> = key.split('-').collect();
    if parts.len() != 3 {
        return Err(DomainError::ValidationError("inchi_key must contain exactly two hyphens".into()));
    }
    let valid_segment = |s: &str| s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if !parts.iter().all(|p| valid_segment(p)) {
        return Err(DomainError::ValidationError("inchi_key contains invalid characters".into()));
    }
    Ok(())
}
