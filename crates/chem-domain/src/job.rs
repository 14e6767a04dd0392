//! Generic background task state, shared by the Task Runtime and the
//! Ingestion Pipeline (spec §3, §4.4, §4.7).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed | JobState::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    CsvIngestion,
    PredictionSubmit,
    PredictionPoll,
    Cleanup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: Uuid,
    pub kind: JobKind,
    pub queue: String,
    pub state: JobState,
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub attempts: u32,
    pub max_attempts: u32,
    pub last_error: Option<String>,
    pub payload: serde_json::Value,
    pub run_after: DateTime<Utc>,
    pub cancel_requested: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(job_id: Uuid, kind: JobKind, queue: impl Into<String>, payload: serde_json::Value, now: DateTime<Utc>) -> Self {
        Job { job_id,
              kind,
              queue: queue.into(),
              state: JobState::Queued,
              total: 0,
              completed: 0,
              failed: 0,
              attempts: 0,
              max_attempts: 3,
              last_error: None,
              payload,
              run_after: now,
              cancel_requested: false,
              created_at: now,
              updated_at: now }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(JobState::Succeeded.is_terminal());
        assert!(!JobState::Running.is_terminal());
    }
}
