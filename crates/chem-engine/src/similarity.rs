//! Re-exports the bit-vector similarity metrics from `chem_domain`. They
//! are pure data-structure math with no RDKit dependency, so the
//! Fingerprint Index can use them without linking `pyo3`; this crate keeps
//! the name `chem_engine::similarity` because spec §4.1 places `similarity`
//! on the Structure Engine's operation list.

pub use chem_domain::similarity::similarity;
pub use chem_domain::SimilarityMetric;
