//! Maps a `Job`'s kind to the handler that knows how to execute it.

use std::collections::HashMap;
use std::sync::Arc;

use chem_domain::JobKind;

use crate::handler::TaskHandler;

#[derive(Default)]
pub struct TaskRegistry {
    handlers: HashMap<JobKindKey, Arc<dyn TaskHandler>>,
}

/// `JobKind` isn't `Hash`; this mirrors it only for registry lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum JobKindKey {
    CsvIngestion,
    PredictionSubmit,
    PredictionPoll,
    Cleanup,
}

impl From<&JobKind> for JobKindKey {
    fn from(kind: &JobKind) -> Self {
        match kind {
            JobKind::CsvIngestion => JobKindKey::CsvIngestion,
            JobKind::PredictionSubmit => JobKindKey::PredictionSubmit,
            JobKind::PredictionPoll => JobKindKey::PredictionPoll,
            JobKind::Cleanup => JobKindKey::Cleanup,
        }
    }
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn TaskHandler>) -> &mut Self {
        let key = JobKindKey::from(&handler.kind());
        self.handlers.insert(key, handler);
        self
    }

    pub fn lookup(&self, kind: &JobKind) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.get(&JobKindKey::from(kind)).cloned()
    }
}
