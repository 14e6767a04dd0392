//! Fingerprint Index (C3, spec §4.3).
//!
//! `similarity_search`/`substructure_search` accept an already-computed
//! query fingerprint or SMARTS pattern, for the same layering reason as
//! `molecule_store`: computing those from a raw SMILES needs the Structure
//! Engine, which is a `pyo3` dependency this crate does not carry.

use async_trait::async_trait;
use chem_domain::{similarity::similarity, Fingerprint, FingerprintData, FingerprintType, SimilarityMetric};
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::rows::{fingerprint_type_str, FingerprintRow};
use crate::PgPool;

#[derive(Debug, Clone)]
pub struct SimilarityHit {
    pub molecule_id: Uuid,
    pub score: f64,
}

#[async_trait]
pub trait FingerprintIndex: Send + Sync {
    async fn put(&self, fingerprint: Fingerprint) -> Result<Fingerprint, PersistenceError>;
    async fn get(&self, molecule_id: Uuid, fingerprint_type: FingerprintType) -> Result<Fingerprint, PersistenceError>;
    async fn similarity_search(&self,
                                query: &FingerprintData,
                                fingerprint_type: FingerprintType,
                                metric: SimilarityMetric,
                                threshold: f64,
                                limit: u32)
                                -> Result<Vec<SimilarityHit>, PersistenceError>;
    /// `substructure_search` delegates pattern matching to a caller-supplied
    /// predicate over each candidate's SMILES, since the match itself needs
    /// RDKit (spec §4.3 `has_substructure`).
    async fn candidate_smiles_for_substructure_search(&self, limit: u32) -> Result<Vec<(Uuid, String)>, PersistenceError>;
}

pub struct PgFingerprintIndex {
    pool: PgPool,
}

impl PgFingerprintIndex {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FingerprintIndex for PgFingerprintIndex {
    async fn put(&self, fingerprint: Fingerprint) -> Result<Fingerprint, PersistenceError> {
        let parameters_json =
            serde_json::to_value(&fingerprint.parameters).map_err(|e| PersistenceError::Unknown(e.to_string()))?;
        let (bytes, sparse_entries): (Option<Vec<u8>>, Option<serde_json::Value>) = match &fingerprint.data {
            FingerprintData::Dense { bytes, .. } => (Some(bytes.clone()), None),
            FingerprintData::Sparse { entries } => {
                let json = serde_json::to_value(entries).map_err(|e| PersistenceError::Unknown(e.to_string()))?;
                (None, Some(json))
            }
        };
        let row: FingerprintRow = sqlx::query_as(
            "INSERT INTO molecule_fingerprint (molecule_id, fingerprint_type, data, sparse_entries, parameters) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (molecule_id, fingerprint_type) DO UPDATE \
                SET data = EXCLUDED.data, sparse_entries = EXCLUDED.sparse_entries, \
                    parameters = EXCLUDED.parameters, created_at = now() \
             RETURNING molecule_id, fingerprint_type, data, sparse_entries, parameters, created_at",
        ).bind(fingerprint.molecule_id)
         .bind(fingerprint_type_str(fingerprint.fingerprint_type))
         .bind(bytes)
         .bind(sparse_entries)
         .bind(parameters_json)
         .fetch_one(&self.pool)
         .await?;
        Fingerprint::try_from(row)
    }

    async fn get(&self, molecule_id: Uuid, fingerprint_type: FingerprintType) -> Result<Fingerprint, PersistenceError> {
        let row: FingerprintRow = sqlx::query_as(
            "SELECT molecule_id, fingerprint_type, data, sparse_entries, parameters, created_at \
             FROM molecule_fingerprint WHERE molecule_id = $1 AND fingerprint_type = $2",
        ).bind(molecule_id)
         .bind(fingerprint_type_str(fingerprint_type))
         .fetch_one(&self.pool)
         .await?;
        Fingerprint::try_from(row)
    }

    async fn similarity_search(&self,
                                query: &FingerprintData,
                                fingerprint_type: FingerprintType,
                                metric: SimilarityMetric,
                                threshold: f64,
                                limit: u32)
                                -> Result<Vec<SimilarityHit>, PersistenceError> {
        // A secondary fingerprint index (spec §4.3 note) would let this run
        // server-side; without one, similarity is scored in-process against
        // every stored fingerprint of the requested type.
        let rows: Vec<FingerprintRow> = sqlx::query_as(
            "SELECT molecule_id, fingerprint_type, data, sparse_entries, parameters, created_at \
             FROM molecule_fingerprint WHERE fingerprint_type = $1",
        ).bind(fingerprint_type_str(fingerprint_type))
         .fetch_all(&self.pool)
         .await?;

        let mut hits: Vec<SimilarityHit> = Vec::new();
        for row in rows {
            let molecule_id = row.molecule_id;
            let fp = Fingerprint::try_from(row)?;
            let score = similarity(query, &fp.data, metric);
            if score >= threshold {
                hits.push(SimilarityHit { molecule_id, score });
            }
        }
        hits.sort_by(|a, b| {
            b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.molecule_id.cmp(&b.molecule_id))
        });
        hits.truncate(limit as usize);
        Ok(hits)
    }

    async fn candidate_smiles_for_substructure_search(&self, limit: u32) -> Result<Vec<(Uuid, String)>, PersistenceError> {
        let rows: Vec<(Uuid, String)> =
            sqlx::query_as("SELECT id, smiles FROM molecule WHERE status != 'archived' ORDER BY created_at ASC LIMIT $1")
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }
}
