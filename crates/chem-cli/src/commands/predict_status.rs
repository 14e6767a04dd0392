//! `predict-status` subcommand: reports a prediction batch's current state
//! (spec §4.6).

use std::sync::Arc;

use chem_persistence::{PgMoleculeStore, PgPool};

use crate::cli::PredictStatusArgs;
use crate::context::build_orchestrator;
use crate::error::CliError;

pub async fn run(args: PredictStatusArgs, molecule_store: Arc<PgMoleculeStore>, pool: PgPool) -> Result<(), CliError> {
    let orchestrator = build_orchestrator(&pool, molecule_store);
    let batch = orchestrator.get_batch(args.batch_id).await?;

    println!("batch {}: status={:?}", batch.id, batch.status);
    println!("  total={} completed={} failed={}", batch.total_count, batch.completed_count, batch.failed_count);
    if let Some(message) = &batch.error_message {
        println!("  error: {message}");
    }
    Ok(())
}
