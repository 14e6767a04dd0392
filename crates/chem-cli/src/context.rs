//! Shared construction of the orchestrator's dependency graph, reused by
//! every subcommand that touches the AI Engine.

use std::sync::Arc;

use chem_orchestrator::Orchestrator;
use chem_persistence::{JobStore, MoleculeStore, PgJobStore, PgMoleculeStore, PgPool, PgPredictionStore, PredictionStore};
use chem_prediction::PredictionClient;
use chem_tasks::Scheduler;

use crate::config::CONFIG;

pub fn build_orchestrator(pool: &PgPool, molecule_store: Arc<PgMoleculeStore>) -> Orchestrator {
    let prediction_store = Arc::new(PgPredictionStore::new(pool.clone()));
    let job_store: Arc<dyn JobStore> = Arc::new(PgJobStore::new(pool.clone()));
    let client = Arc::new(PredictionClient::new(CONFIG.prediction_client_config()));
    let scheduler = Arc::new(Scheduler::new(job_store));
    Orchestrator::new(prediction_store as Arc<dyn PredictionStore>,
                       molecule_store as Arc<dyn MoleculeStore>,
                       client,
                       scheduler)
}
