//! chem-orchestrator
//!
//! The Prediction Orchestrator (C6): drives a `PredictionBatch` through
//! submit → processing → completed/failed, schedules and runs the polling
//! task that ingests results, and handles cancellation and retry
//! (spec §4.6). Built on the `BatchStatus` state machine already enforced
//! in `chem_domain::prediction`.

pub mod cancel;
pub mod error;
pub mod handlers;
pub mod orchestrator;
pub mod poll;
pub mod submission;

pub use error::OrchestratorError;
pub use handlers::{PollPayload, PredictionPollHandler, PredictionSubmitHandler, SubmitPayload};
pub use orchestrator::Orchestrator;
pub use poll::PollOutcome;
