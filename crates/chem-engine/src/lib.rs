//! Structure Engine: a pure, deterministic wrapper around RDKit (spec §4.1).
//!
//! Every operation returns a value or a typed `EngineError`; nothing panics
//! or raises on merely invalid chemistry, only on interpreter-level
//! corruption.

pub mod descriptors;
pub mod engine;
pub mod error;
pub mod similarity;

pub use descriptors::MoleculeDescriptors;
pub use engine::{ChemEngine, ENGINE};
pub use error::EngineError;
pub use similarity::SimilarityMetric;
