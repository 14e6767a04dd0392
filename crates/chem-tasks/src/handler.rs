//! Task handler trait and the outcome vocabulary a handler can return
//! (spec §4.7: completion, cooperative self-rescheduling, or failure).

use async_trait::async_trait;
use chem_domain::JobKind;
use uuid::Uuid;

use crate::error::TaskError;

/// What a handler observed after one execution attempt.
pub enum TaskOutcome {
    /// The task's work is done; the job is marked `succeeded`.
    Completed,
    /// The task wants to run again after a delay (e.g. prediction polling).
    /// Maps to `reschedule(self, countdown_s)`.
    Reschedule { after_s: u64 },
}

/// Per-attempt context handed to a handler: its own identity, current retry
/// count, and a way to observe cooperative cancellation at a checkpoint.
pub struct TaskContext {
    pub job_id: Uuid,
    pub attempts: u32,
    pub max_attempts: u32,
    pub cancel_requested: bool,
}

impl TaskContext {
    /// Handlers that poll in a loop should call this between iterations and
    /// bail out with `TaskError::Cancelled` if it returns `true`.
    pub fn should_abort(&self) -> bool {
        self.cancel_requested
    }
}

#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// The job kind this handler executes; the registry dispatches on this.
    fn kind(&self) -> JobKind;

    async fn run(&self, ctx: &TaskContext, payload: serde_json::Value) -> Result<TaskOutcome, TaskError>;
}
