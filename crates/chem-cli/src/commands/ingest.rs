//! `ingest` subcommand: drives the CSV ingestion pipeline end to end
//! against the suggested column mapping (spec §4.4 Phases 1-7).

use std::sync::Arc;

use chem_ingest::{BlobStore, InMemoryBlobStore, IngestionPipeline};
use chem_persistence::{PgMoleculeStore, PgPool};

use crate::cli::IngestArgs;
use crate::context::build_orchestrator;
use crate::enricher::OrchestratorEnricher;
use crate::error::CliError;

pub async fn run(args: IngestArgs, molecule_store: Arc<PgMoleculeStore>, pool: PgPool) -> Result<(), CliError> {
    let bytes = std::fs::read(&args.file).map_err(|e| CliError::Usage(format!("failed to read {}: {e}", args.file.display())))?;
    let filename = args.file.file_name().and_then(|n| n.to_str()).unwrap_or("upload.csv").to_string();

    let blobs: Arc<dyn BlobStore> = Arc::new(InMemoryBlobStore::new());
    let mut pipeline = IngestionPipeline::new(molecule_store.clone(), blobs);
    if args.enrich {
        let orchestrator = Arc::new(build_orchestrator(&pool, molecule_store.clone()));
        let enricher = Arc::new(OrchestratorEnricher::new(orchestrator, args.properties.clone(), args.created_by));
        pipeline = pipeline.with_enricher(enricher);
    }

    let storage_key = pipeline.accept(&filename, bytes).await?;
    let preview = pipeline.preview(&storage_key).await?;
    if IngestionPipeline::<PgMoleculeStore>::should_run_in_background(preview.total_data_rows) {
        log::warn!("{} data rows exceeds the inline-processing threshold; running inline anyway \
                     (background job dispatch is not wired into this entry point)",
                    preview.total_data_rows);
    }

    let report = pipeline.run(&storage_key, preview.suggested_mapping, args.created_by, args.enrich).await?;

    println!("rows processed: {}", report.rows_processed);
    println!("molecules created: {}", report.molecules_created);
    println!("molecules skipped (already known): {}", report.molecules_skipped_existing);
    println!("rows failed: {}", report.rows_failed);
    if report.row_errors_truncated {
        println!("row error report truncated at {} entries", report.row_errors.len());
    }
    for err in &report.row_errors {
        match &err.column {
            Some(column) => println!("  row {}: [{column}] {}", err.row, err.message),
            None => println!("  row {}: {}", err.row, err.message),
        }
    }
    if let Some(batch_id) = report.prediction_batch_id {
        println!("prediction batch submitted: {batch_id}");
    }
    Ok(())
}
