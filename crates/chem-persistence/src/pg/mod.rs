//! Postgres implementations of the Molecule Store (C2) and Fingerprint
//! Index (C3), backed by `sqlx`.

pub mod fingerprint_index;
pub mod job_store;
pub mod molecule_store;
pub mod prediction_store;

pub use fingerprint_index::{FingerprintIndex, PgFingerprintIndex, SimilarityHit};
pub use job_store::{JobStore, PgJobStore};
pub use molecule_store::{BatchCreateOutcome, MoleculeCandidate, MoleculeFilter, MoleculeSort, MoleculeStore, PgMoleculeStore,
                          PropertyRangeFilter};
pub use prediction_store::{PgPredictionStore, PredictionStore};

use sqlx::postgres::PgPoolOptions;

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;

pub type PgPool = sqlx::PgPool;

/// Builds a pool against `database_url` and runs pending migrations once
/// against the first checked-out connection.
pub async fn build_pool(database_url: &str, min_connections: u32, max_connections: u32) -> Result<PgPool, PersistenceError> {
    let max_connections = max_connections.max(1);
    let min_connections = min_connections.min(max_connections);
    let pool = PgPoolOptions::new().min_connections(min_connections)
                                   .max_connections(max_connections)
                                   .connect(database_url)
                                   .await?;
    run_pending_migrations(&pool).await?;
    Ok(pool)
}

/// Development convenience: loads `.env`, reads `DbConfig`, builds a
/// migrated pool.
pub async fn build_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env();
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections).await
}
