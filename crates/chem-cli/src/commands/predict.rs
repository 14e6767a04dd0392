//! `predict` subcommand: submits molecules for property prediction and
//! schedules their polling task (spec §4.6).

use std::sync::Arc;

use chem_persistence::{PgMoleculeStore, PgPool};

use crate::cli::PredictArgs;
use crate::context::build_orchestrator;
use crate::error::CliError;

pub async fn run(args: PredictArgs, molecule_store: Arc<PgMoleculeStore>, pool: PgPool) -> Result<(), CliError> {
    let orchestrator = build_orchestrator(&pool, molecule_store);
    let batch_ids = orchestrator.submit_batch(args.molecule_ids, args.properties, args.created_by).await?;
    for batch_id in batch_ids {
        println!("submitted prediction batch {batch_id}");
    }
    Ok(())
}
