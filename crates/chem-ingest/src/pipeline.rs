//! The 7-phase CSV ingestion pipeline (spec §4.4): Accept, Preview, Validate
//! Mapping, Process, Commit, Enrich, Report. Grounded on
//! `original_source/csv_parser.py`'s `CSVProcessor`
//! (`load`/`set_mapping`/`process`/`get_summary`) and chunked-reading
//! pattern (`process_csv_in_chunks`).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chem_domain::constants::{
    seed_property_definitions, DEFAULT_CHUNK_SIZE, LARGE_FILE_THRESHOLD, MAX_CSV_SIZE_MB, MAX_ROWS, ROW_ERROR_REPORT_LIMIT,
};
use chem_domain::{ErrorKind, PropertyValue};
use chem_persistence::{MoleculeCandidate, MoleculeStore};
use uuid::Uuid;

use crate::blob_store::{mint_storage_key, BlobStore};
use crate::error::IngestError;
use crate::mapping::{suggest_column_mapping, validate_mapping};

/// Phase 6 (Enrich): submits newly-created molecules for prediction. The
/// pipeline only needs to hand off ids; the orchestration logic itself
/// lives in `chem-orchestrator`, which this crate does not depend on, so
/// the caller (`chem-cli`) supplies an implementation at construction time.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn submit(&self, molecule_ids: Vec<Uuid>) -> Result<Uuid, IngestError>;
}

/// A single row-level problem, preserving input row order (spec §4.4 Phase
/// 4, §7: reported rows capped at `ROW_ERROR_REPORT_LIMIT`). `kind` carries
/// the same stable machine-readable code as `CoreError::kind`, so a job
/// summary crossing out of this crate doesn't lose it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RowError {
    pub row: usize,
    pub column: Option<String>,
    pub message: String,
    pub kind: ErrorKind,
}

impl RowError {
    pub fn to_core_error(&self) -> chem_domain::CoreError {
        let mut err = chem_domain::CoreError::new(self.kind, self.message.clone()).with_detail("row", self.row);
        if let Some(column) = &self.column {
            err = err.with_detail("column", column.clone());
        }
        err
    }
}

/// Result of Phase 2 (Preview): headers, a short sample, and a suggested
/// mapping the caller may accept or override before Phase 3.
#[derive(Debug, Clone)]
pub struct Preview {
    pub headers: Vec<String>,
    pub sample_rows: Vec<HashMap<String, String>>,
    pub suggested_mapping: HashMap<String, String>,
    pub total_data_rows: usize,
}

const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Final outcome of a run (spec §4.4 Phase 7: Report).
#[derive(Debug, Clone, serde::Serialize)]
pub struct IngestReport {
    pub rows_processed: usize,
    pub molecules_created: usize,
    pub molecules_skipped_existing: usize,
    pub rows_failed: usize,
    pub row_errors: Vec<RowError>,
    pub row_errors_truncated: bool,
    /// Present when Phase 4 exceeded `LARGE_FILE_THRESHOLD` and the run was
    /// dispatched to the background instead of running inline.
    pub job_id: Option<Uuid>,
    /// Present when Phase 6 (Enrich) submitted the newly-created molecules
    /// for prediction (spec §4.4 Phase 7).
    pub prediction_batch_id: Option<Uuid>,
}

/// Orchestrates Phases 1-7 over one CSV upload. Structure identity (C1) is
/// computed per row via the `chem-engine` singleton; persistence (C2) is
/// reached through the injected `MoleculeStore`.
pub struct IngestionPipeline<S: MoleculeStore> {
    store: Arc<S>,
    blobs: Arc<dyn BlobStore>,
    enricher: Option<Arc<dyn Enricher>>,
}

impl<S: MoleculeStore> IngestionPipeline<S> {
    pub fn new(store: Arc<S>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs, enricher: None }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Phase 1: Accept. Validates size and basic CSV shape, then persists
    /// the raw upload under a freshly minted storage key.
    pub async fn accept(&self, filename: &str, bytes: Vec<u8>) -> Result<String, IngestError> {
        let limit_bytes = MAX_CSV_SIZE_MB * 1024 * 1024;
        if bytes.len() as u64 > limit_bytes {
            return Err(IngestError::FileTooLarge { limit_mb: MAX_CSV_SIZE_MB });
        }
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes.as_slice());
        reader.headers().map_err(|e| IngestError::InvalidCsvFormat(e.to_string()))?;

        let key = mint_storage_key(filename);
        self.blobs.put(&key, bytes).await?;
        Ok(key)
    }

    /// Phase 2: Preview. Reads the first few rows and proposes a column
    /// mapping without committing to anything.
    pub async fn preview(&self, storage_key: &str) -> Result<Preview, IngestError> {
        let bytes = self.blobs.get(storage_key).await?;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers().map_err(|e| IngestError::InvalidCsvFormat(e.to_string()))?
                                          .iter()
                                          .map(str::to_string)
                                          .collect();

        let mut sample_rows = Vec::new();
        let mut total = 0usize;
        for result in reader.records() {
            let record = result.map_err(|e| IngestError::InvalidCsvFormat(e.to_string()))?;
            if sample_rows.len() < DEFAULT_PREVIEW_ROWS {
                let row: HashMap<String, String> =
                    headers.iter().cloned().zip(record.iter().map(str::to_string)).collect();
                sample_rows.push(row);
            }
            total += 1;
        }
        if total > MAX_ROWS {
            return Err(IngestError::TooManyRows { rows: total, limit: MAX_ROWS });
        }

        let definitions = seed_property_definitions();
        let suggested_mapping = suggest_column_mapping(&headers, &definitions);
        Ok(Preview { headers, sample_rows, suggested_mapping, total_data_rows: total })
    }

    /// Phase 3: Validate Mapping. Delegates to `mapping::validate_mapping`
    /// with the catalog of known, non-custom property names.
    pub fn validate(&self, headers: &[String], mapping: &HashMap<String, String>) -> Result<(), IngestError> {
        let definitions = seed_property_definitions();
        let known: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
        validate_mapping(headers, mapping, &known)
    }

    /// Phases 4-7: Process, Commit, Enrich, Report. Runs inline for row
    /// counts at or below `LARGE_FILE_THRESHOLD`; above that, the caller is
    /// expected to have already wrapped this call in a background `Job`
    /// (spec §4.4 Phase 4, §4.7) — `run` itself is agnostic to how it was
    /// scheduled and always returns a complete report.
    pub async fn run(&self,
                      storage_key: &str,
                      mapping: HashMap<String, String>,
                      created_by: Uuid,
                      enrich: bool)
                      -> Result<IngestReport, IngestError> {
        let bytes = self.blobs.get(storage_key).await?;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes.as_slice());
        let headers: Vec<String> =
            reader.headers().map_err(|e| IngestError::InvalidCsvFormat(e.to_string()))?.iter().map(str::to_string).collect();
        self.validate(&headers, &mapping)?;

        let smiles_column = mapping.iter()
                                    .find(|(_, target)| target.as_str() == "smiles")
                                    .map(|(col, _)| col.clone())
                                    .ok_or(IngestError::MissingSmilesMapping)?;
        let definitions: HashMap<String, chem_domain::PropertyDefinition> =
            seed_property_definitions().into_iter().map(|d| (d.name.clone(), d)).collect();

        let mut row_errors = Vec::new();
        let mut candidates = Vec::new();
        let mut rows_processed = 0usize;

        for (row_index, result) in reader.records().enumerate() {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    push_row_error(&mut row_errors, row_index, None, e.to_string(), ErrorKind::InvalidCsvFormat);
                    continue;
                }
            };
            rows_processed += 1;
            let row: HashMap<String, String> = headers.iter().cloned().zip(record.iter().map(str::to_string)).collect();

            let Some(smiles) = row.get(&smiles_column).map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
                push_row_error(&mut row_errors, row_index, Some(smiles_column.clone()), "smiles value is empty".to_string(),
                                ErrorKind::InvalidSmiles);
                continue;
            };

            let engine = match chem_engine::ChemEngine::global() {
                Ok(e) => e,
                Err(e) => {
                    push_row_error(&mut row_errors, row_index, Some(smiles_column.clone()), e.to_string(),
                                    ErrorKind::UnexpectedError);
                    continue;
                }
            };
            let mut row_ok = true;
            let mut basic_properties = Vec::new();
            for (csv_col, target) in &mapping {
                if target == "smiles" || csv_col == &smiles_column {
                    continue;
                }
                let Some(raw) = row.get(csv_col).map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
                    continue;
                };
                if let Some(def) = definitions.get(target) {
                    match parse_property_value(&raw, def.property_type) {
                        Ok(value) => {
                            if let Err(e) = def.validate_value(&value) {
                                push_row_error(&mut row_errors, row_index, Some(csv_col.clone()), e.to_string(),
                                                ErrorKind::InvalidPropertyValue);
                                row_ok = false;
                                continue;
                            }
                            basic_properties.push((target.clone(), value));
                        }
                        Err(e) => {
                            push_row_error(&mut row_errors, row_index, Some(csv_col.clone()), e, ErrorKind::InvalidPropertyValue);
                            row_ok = false;
                        }
                    }
                } else {
                    basic_properties.push((target.clone(), PropertyValue::String(raw)));
                }
            }
            if !row_ok {
                continue;
            }

            let candidate = match build_candidate(engine, &smiles, basic_properties) {
                Ok(c) => c,
                Err(message) => {
                    push_row_error(&mut row_errors, row_index, Some(smiles_column.clone()), message, ErrorKind::InvalidSmiles);
                    continue;
                }
            };
            candidates.push(candidate);
        }

        let mut molecules_created = 0usize;
        let mut molecules_skipped_existing = 0usize;
        let mut created_ids = Vec::new();
        for chunk in candidates.chunks(DEFAULT_CHUNK_SIZE) {
            let outcome = self.store.batch_create(chunk.to_vec(), created_by).await;
            molecules_created += outcome.created.len();
            molecules_skipped_existing += outcome.skipped.len();
            created_ids.extend(outcome.created.iter().map(|m| m.id));
            for (offset, message) in outcome.failed {
                push_row_error(&mut row_errors, offset, None, message, ErrorKind::DuplicateMolecule);
            }
        }

        let rows_failed = row_errors.len();
        let row_errors_truncated = row_errors.len() > ROW_ERROR_REPORT_LIMIT;
        row_errors.truncate(ROW_ERROR_REPORT_LIMIT);

        let prediction_batch_id = if enrich && !created_ids.is_empty() {
            match &self.enricher {
                Some(enricher) => match enricher.submit(created_ids).await {
                    Ok(batch_id) => Some(batch_id),
                    Err(e) => {
                        log::warn!("enrichment submission failed: {e}");
                        None
                    }
                },
                None => {
                    log::warn!("enrichment requested but no Enricher configured");
                    None
                }
            }
        } else {
            None
        };

        Ok(IngestReport { rows_processed,
                           molecules_created,
                           molecules_skipped_existing,
                           rows_failed,
                           row_errors,
                           row_errors_truncated,
                           job_id: None,
                           prediction_batch_id })
    }

    /// Whether a CSV with this many data rows should run inline (spec §4.4
    /// Phase 4: rows at or below `LARGE_FILE_THRESHOLD` run synchronously,
    /// larger ones are dispatched as a background `Job`).
    pub fn should_run_in_background(total_data_rows: usize) -> bool {
        total_data_rows > LARGE_FILE_THRESHOLD
    }
}

fn push_row_error(errors: &mut Vec<RowError>, row: usize, column: Option<String>, message: String, kind: ErrorKind) {
    errors.push(RowError { row, column, message, kind });
}

fn parse_property_value(raw: &str, property_type: chem_domain::PropertyType) -> Result<PropertyValue, String> {
    use chem_domain::PropertyType;
    match property_type {
        PropertyType::Numeric => raw.parse::<f64>().map(PropertyValue::Number).map_err(|_| format!("'{raw}' is not numeric")),
        PropertyType::Integer => raw.parse::<i64>().map(PropertyValue::Integer).map_err(|_| format!("'{raw}' is not an integer")),
        PropertyType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(PropertyValue::Boolean(true)),
            "false" | "0" | "no" => Ok(PropertyValue::Boolean(false)),
            _ => Err(format!("'{raw}' is not a boolean")),
        },
        PropertyType::String => Ok(PropertyValue::String(raw.to_string())),
    }
}

fn build_candidate(engine: &chem_engine::ChemEngine,
                    smiles: &str,
                    mut basic_properties: Vec<(String, PropertyValue)>)
                    -> Result<MoleculeCandidate, String> {
    engine.parse_smiles(smiles).map_err(|e| e.to_string())?;
    let canonical = engine.canonicalize(smiles).map_err(|e| e.to_string())?;
    let inchi_key = engine.inchi_key(&canonical).map_err(|e| e.to_string())?;
    let formula = engine.molecular_formula(&canonical).map_err(|e| e.to_string())?;
    let molecular_weight = engine.molecular_weight(&canonical).map_err(|e| e.to_string())?;

    if !basic_properties.iter().any(|(n, _)| n == "molecular_weight") {
        basic_properties.push(("molecular_weight".to_string(), PropertyValue::Number(molecular_weight)));
    }
    if let Ok(logp) = engine.logp(&canonical) {
        if !basic_properties.iter().any(|(n, _)| n == "logp") {
            basic_properties.push(("logp".to_string(), PropertyValue::Number(logp)));
        }
    }
    if let Ok(tpsa) = engine.tpsa(&canonical) {
        if !basic_properties.iter().any(|(n, _)| n == "tpsa") {
            basic_properties.push(("tpsa".to_string(), PropertyValue::Number(tpsa)));
        }
    }

    Ok(MoleculeCandidate { smiles: canonical, inchi_key, formula, molecular_weight, basic_properties })
}
