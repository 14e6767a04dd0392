//! chem-persistence
//!
//! Postgres implementations of the Molecule Store (C2), Fingerprint Index
//! (C3), and the durable state the Task Runtime (C7) and Prediction
//! Orchestrator (C6) build on: connection/pool setup, embedded migrations,
//! and `sqlx`-backed repository traits.
//!
//! Modules:
//! - `pg`: Postgres implementations (`molecule_store`, `fingerprint_index`,
//!   `job_store`, `prediction_store`).
//! - `rows`: `sqlx::FromRow` row shapes and their conversions to `chem_domain` types.
//! - `migrations`: embedded `sqlx::migrate!` runner.
//! - `config`: connection settings loaded from `.env`.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod rows;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use pg::{build_pool, build_pool_from_env, BatchCreateOutcome, FingerprintIndex, JobStore, MoleculeCandidate,
             MoleculeFilter, MoleculeSort, MoleculeStore, PgFingerprintIndex, PgJobStore, PgMoleculeStore, PgPool,
             PgPredictionStore, PredictionStore, PropertyRangeFilter, SimilarityHit};
