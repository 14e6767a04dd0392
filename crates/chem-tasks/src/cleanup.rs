//! Ambient housekeeping: purges terminal `Job` rows older than a retention
//! window, grounded on
//! `original_source/src/backend/app/tasks/cleanup.py`. Runs on the
//! `default` queue alongside whatever else has no dedicated queue.

use std::sync::Arc;

use async_trait::async_trait;
use chem_domain::JobKind;
use chem_persistence::JobStore;
use chrono::Utc;

use crate::error::TaskError;
use crate::handler::{TaskContext, TaskHandler, TaskOutcome};

/// How long a succeeded/failed/cancelled job row is kept before this task
/// purges it.
pub const DEFAULT_JOB_RETENTION_S: i64 = 7 * 24 * 3600;

pub struct CleanupHandler {
    pub store: Arc<dyn JobStore>,
    pub retention_s: i64,
}

impl CleanupHandler {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store, retention_s: DEFAULT_JOB_RETENTION_S }
    }
}

#[async_trait]
impl TaskHandler for CleanupHandler {
    fn kind(&self) -> JobKind {
        JobKind::Cleanup
    }

    async fn run(&self, _ctx: &TaskContext, _payload: serde_json::Value) -> Result<TaskOutcome, TaskError> {
        let before = Utc::now() - chrono::Duration::seconds(self.retention_s);
        let purged = self.store.purge_terminal_before(before).await?;
        log::info!("cleanup task purged {purged} terminal job row(s) older than {}s", self.retention_s);
        Ok(TaskOutcome::Completed)
    }
}
