//! chem-domain library entry point.
//!
//! Shared entity and value types used by every other crate: `Molecule`,
//! `MoleculeProperty`, `PropertyDefinition`, `Library`, `Fingerprint`,
//! `PredictionBatch`, `Prediction`, `Job`, plus the error taxonomy and
//! pagination helper.

pub mod constants;
pub mod errors;
pub mod fingerprint;
pub mod job;
pub mod library;
pub mod molecule;
pub mod pagination;
pub mod prediction;
pub mod property;
pub mod similarity;

pub use errors::{CoreError, DomainError, ErrorKind};
pub use fingerprint::{Fingerprint, FingerprintData, FingerprintParameters, FingerprintType};
pub use job::{Job, JobKind, JobState};
pub use library::{Library, LibraryMolecule};
pub use molecule::{Molecule, MoleculeStatus};
pub use pagination::{Page, Pagination};
pub use prediction::{BatchStatus, Prediction, PredictionBatch, PredictionStatus};
pub use property::{MoleculeProperty, PropertyCategory, PropertyDefinition, PropertySource, PropertyType, PropertyValue};
pub use similarity::SimilarityMetric;
