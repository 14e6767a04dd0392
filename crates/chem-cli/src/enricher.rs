//! Bridges ingestion's Phase 6 (Enrich) to the Prediction Orchestrator.
//! `chem-ingest` only knows about the `Enricher` trait (it does not depend
//! on `chem-orchestrator`); this crate supplies the implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chem_domain::constants::PREDICTABLE_PROPERTIES;
use chem_ingest::{Enricher, IngestError};
use chem_orchestrator::Orchestrator;
use uuid::Uuid;

pub struct OrchestratorEnricher {
    orchestrator: Arc<Orchestrator>,
    properties: Vec<String>,
    created_by: Uuid,
}

impl OrchestratorEnricher {
    pub fn new(orchestrator: Arc<Orchestrator>, properties: Vec<String>, created_by: Uuid) -> Self {
        let properties = if properties.is_empty() {
            PREDICTABLE_PROPERTIES.iter().map(|s| s.to_string()).collect()
        } else {
            properties
        };
        Self { orchestrator, properties, created_by }
    }
}

#[async_trait]
impl Enricher for OrchestratorEnricher {
    async fn submit(&self, molecule_ids: Vec<Uuid>) -> Result<Uuid, IngestError> {
        let batch_ids = self.orchestrator
                             .submit_batch(molecule_ids, self.properties.clone(), self.created_by)
                             .await
                             .map_err(|e| IngestError::Enrichment(e.to_string()))?;
        batch_ids.into_iter().next().ok_or_else(|| IngestError::Enrichment("submission produced no batch".to_string()))
    }
}
