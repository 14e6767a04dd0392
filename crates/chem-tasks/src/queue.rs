//! Named queues and task routing (spec §4.7).

/// CSV ingestion chunk processing.
pub const CSV_PROCESSING: &str = "csv_processing";
/// Prediction batch submission and polling.
pub const AI_PREDICTIONS: &str = "ai_predictions";
/// User-facing notifications about completed jobs.
pub const NOTIFICATIONS: &str = "notifications";
/// Document/report generation.
pub const DOCUMENT_PROCESSING: &str = "document_processing";
/// Post-processing of prediction or ingestion results.
pub const RESULT_PROCESSING: &str = "result_processing";
/// Periodic housekeeping: purges terminal job rows past their retention
/// window.
pub const CLEANUP: &str = "cleanup";
/// Catch-all for tasks with no dedicated queue.
pub const DEFAULT: &str = "default";

pub const ALL_QUEUES: &[&str] =
    &[CSV_PROCESSING, AI_PREDICTIONS, NOTIFICATIONS, DOCUMENT_PROCESSING, RESULT_PROCESSING, CLEANUP, DEFAULT];

/// Tasks are named `tasks.<queue>.<action>`; this pulls the queue segment
/// back out, falling back to `default` for anything unprefixed or unknown.
pub fn route(task_name: &str) -> &'static str {
    let queue = task_name.strip_prefix("tasks.").and_then(|rest| rest.split('.').next()).unwrap_or("");
    ALL_QUEUES.iter().find(|q| **q == queue).copied().unwrap_or(DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_known_queue() {
        assert_eq!(route("tasks.ai_predictions.poll_batch"), AI_PREDICTIONS);
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(route("tasks.nonexistent.frob"), DEFAULT);
        assert_eq!(route("not-a-task-name"), DEFAULT);
    }
}
