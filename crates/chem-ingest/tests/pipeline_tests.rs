//! Integration tests for the ingestion pipeline's file-facing phases
//! (Accept, Preview, Validate Mapping) plus an end-to-end run gated behind
//! a real RDKit interpreter, matching `chem-engine`'s own test gating.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chem_domain::{Library, Molecule, MoleculeProperty, MoleculeStatus, Page, Pagination, PropertySource, PropertyValue};
use chem_ingest::{BlobStore, IngestError, InMemoryBlobStore, IngestionPipeline};
use chem_persistence::{BatchCreateOutcome, MoleculeCandidate, MoleculeFilter, MoleculeSort, MoleculeStore, PersistenceError};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct MockMoleculeStore {
    by_inchi_key: Mutex<HashMap<String, Molecule>>,
}

#[async_trait]
impl MoleculeStore for MockMoleculeStore {
    async fn create_from_smiles(&self, _candidate: MoleculeCandidate, _created_by: Uuid) -> Result<Molecule, PersistenceError> {
        unimplemented!("not exercised by these tests")
    }

    async fn get(&self, _id: Uuid) -> Result<Molecule, PersistenceError> {
        Err(PersistenceError::NotFound)
    }

    async fn get_by_smiles(&self, _smiles: &str) -> Result<Molecule, PersistenceError> {
        Err(PersistenceError::NotFound)
    }

    async fn get_by_inchi_key(&self, key: &str) -> Result<Molecule, PersistenceError> {
        self.by_inchi_key.lock().await.get(key).cloned().ok_or(PersistenceError::NotFound)
    }

    async fn set_property(&self,
                           _molecule_id: Uuid,
                           _name: &str,
                           _value: PropertyValue,
                           _source: PropertySource,
                           _units: Option<String>,
                           _confidence: Option<f64>)
                           -> Result<MoleculeProperty, PersistenceError> {
        unimplemented!("not exercised by these tests")
    }

    async fn get_property(&self,
                          _molecule_id: Uuid,
                          _name: &str,
                          _source: Option<PropertySource>)
                          -> Result<MoleculeProperty, PersistenceError> {
        unimplemented!("not exercised by these tests")
    }

    async fn filter(&self,
                     _criteria: MoleculeFilter,
                     pagination: Pagination,
                     _sort: MoleculeSort)
                     -> Result<Page<Molecule>, PersistenceError> {
        Ok(Page::new(Vec::new(), 0, pagination))
    }

    async fn batch_create(&self, candidates: Vec<MoleculeCandidate>, created_by: Uuid) -> BatchCreateOutcome {
        let mut outcome = BatchCreateOutcome::default();
        let mut store = self.by_inchi_key.lock().await;
        for candidate in candidates {
            if let Some(existing) = store.get(&candidate.inchi_key) {
                outcome.skipped.push(existing.clone());
                continue;
            }
            let molecule = Molecule { id: Uuid::new_v4(),
                                       smiles: candidate.smiles.clone(),
                                       inchi_key: candidate.inchi_key.clone(),
                                       formula: candidate.formula.clone(),
                                       molecular_weight: candidate.molecular_weight,
                                       status: MoleculeStatus::Available,
                                       attributes: serde_json::json!({}),
                                       created_by,
                                       created_at: chrono::Utc::now(),
                                       updated_at: chrono::Utc::now() };
            store.insert(candidate.inchi_key.clone(), molecule.clone());
            outcome.created.push(molecule);
        }
        outcome
    }

    async fn add_molecule_to_library(&self, _library_id: Uuid, _molecule_id: Uuid, _added_by: Uuid) -> Result<bool, PersistenceError> {
        Ok(true)
    }

    async fn remove_molecule_from_library(&self,
                                           _library_id: Uuid,
                                           _molecule_id: Uuid)
                                           -> Result<bool, PersistenceError> {
        Ok(true)
    }

    async fn get_library_molecules(&self, _library_id: Uuid, pagination: Pagination) -> Result<Page<Molecule>, PersistenceError> {
        Ok(Page::new(Vec::new(), 0, pagination))
    }

    async fn create_library(&self, library: Library) -> Result<Library, PersistenceError> {
        Ok(library)
    }

    async fn get_library(&self, _id: Uuid) -> Result<Library, PersistenceError> {
        Err(PersistenceError::NotFound)
    }
}

fn pipeline() -> IngestionPipeline<MockMoleculeStore> {
    IngestionPipeline::new(Arc::new(MockMoleculeStore::default()), Arc::new(InMemoryBlobStore::new()) as Arc<dyn BlobStore>)
}

#[tokio::test]
async fn accept_rejects_oversized_file() {
    let pipeline = pipeline();
    let oversized = vec![b'a'; 101 * 1024 * 1024];
    let err = pipeline.accept("big.csv", oversized).await.unwrap_err();
    assert!(matches!(err, IngestError::FileTooLarge { .. }));
}

#[tokio::test]
async fn accept_rejects_non_csv_bytes() {
    let pipeline = pipeline();
    let err = pipeline.accept("not_csv.bin", vec![0u8, 159, 146, 150]).await.unwrap_err();
    assert!(matches!(err, IngestError::InvalidCsvFormat(_)));
}

#[tokio::test]
async fn accept_then_preview_round_trips() {
    let pipeline = pipeline();
    let csv_bytes = b"Structure,MW,LogP\nCCO,46.07,-0.31\nc1ccccc1,78.11,2.13\n".to_vec();
    let key = pipeline.accept("molecules.csv", csv_bytes).await.unwrap();

    let preview = pipeline.preview(&key).await.unwrap();
    assert_eq!(preview.headers, vec!["Structure", "MW", "LogP"]);
    assert_eq!(preview.total_data_rows, 2);
    assert_eq!(preview.sample_rows.len(), 2);
    assert_eq!(preview.suggested_mapping.get("Structure"), Some(&"smiles".to_string()));
    assert_eq!(preview.suggested_mapping.get("MW"), Some(&"molecular_weight".to_string()));
    assert_eq!(preview.suggested_mapping.get("LogP"), Some(&"logp".to_string()));
}

#[tokio::test]
async fn validate_rejects_mapping_missing_smiles() {
    let pipeline = pipeline();
    let mut mapping = HashMap::new();
    mapping.insert("MW".to_string(), "molecular_weight".to_string());
    let err = pipeline.validate(&["MW".to_string()], &mapping).unwrap_err();
    assert!(matches!(err, IngestError::MissingSmilesMapping));
}

#[tokio::test]
#[ignore = "requires a Python interpreter with RDKit installed"]
async fn run_commits_valid_rows_and_reports_row_errors() {
    let pipeline = pipeline();
    let csv_bytes = b"smiles,molecular_weight\nCCO,46.07\nnot a smiles,12.0\nCCO,46.07\n".to_vec();
    let key = pipeline.accept("molecules.csv", csv_bytes).await.unwrap();

    let mut mapping = HashMap::new();
    mapping.insert("smiles".to_string(), "smiles".to_string());
    mapping.insert("molecular_weight".to_string(), "molecular_weight".to_string());

    let report = pipeline.run(&key, mapping, Uuid::new_v4(), false).await.unwrap();
    assert_eq!(report.rows_processed, 3);
    assert_eq!(report.molecules_created, 1);
    assert_eq!(report.molecules_skipped_existing, 1);
    assert_eq!(report.rows_failed, 1);
}
