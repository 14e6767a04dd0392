//! chem-ingest
//!
//! The Ingestion Pipeline (C4): accepts a CSV upload, previews its columns,
//! validates a column mapping, then processes, commits, and reports on the
//! rows. Structural identity for each row is computed through `chem-engine`
//! (C1) and handed to `chem-persistence` (C2) as a `MoleculeCandidate`.

pub mod blob_store;
pub mod error;
pub mod mapping;
pub mod pipeline;

pub use blob_store::{mint_storage_key, BlobStore, InMemoryBlobStore};
pub use error::IngestError;
pub use mapping::{suggest_column_mapping, validate_mapping};
pub use pipeline::{Enricher, IngestReport, IngestionPipeline, Preview, RowError};
