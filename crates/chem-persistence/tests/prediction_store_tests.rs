//! Gated integration tests for `PredictionStore::set_batch_status`'s
//! transition guard (spec §4.6 state diagram). Skipped (not failed) when
//! `DATABASE_URL` isn't set.

use chem_domain::{BatchStatus, PredictionBatch};
use chem_persistence::{build_pool, PersistenceError, PgPredictionStore, PredictionStore};
use uuid::Uuid;

async fn test_pool() -> Option<sqlx::PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(build_pool(&url, 1, 4).await.expect("failed to build pool against DATABASE_URL"))
}

async fn seed_batch(store: &PgPredictionStore) -> PredictionBatch {
    let batch = PredictionBatch::new(Uuid::new_v4(),
                                      vec![Uuid::new_v4()],
                                      vec!["logp".to_string()],
                                      "test-model",
                                      "v1",
                                      Uuid::new_v4(),
                                      chrono::Utc::now());
    store.create_batch(batch).await.expect("seed batch insert")
}

#[tokio::test]
async fn set_batch_status_rejects_a_transition_skipping_processing() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping set_batch_status_rejects_a_transition_skipping_processing: DATABASE_URL not set");
        return;
    };
    let store = PgPredictionStore::new(pool);
    let batch = seed_batch(&store).await;
    assert_eq!(batch.status, BatchStatus::Pending);

    // Pending -> Completed is not in the allowed transition table.
    let err = store.set_batch_status(batch.id, BatchStatus::Completed, None).await.unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound));

    let unchanged = store.get_batch(batch.id).await.expect("batch should still exist");
    assert_eq!(unchanged.status, BatchStatus::Pending);
}

#[tokio::test]
async fn set_batch_status_allows_pending_to_processing_to_completed() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping set_batch_status_allows_pending_to_processing_to_completed: DATABASE_URL not set");
        return;
    };
    let store = PgPredictionStore::new(pool);
    let batch = seed_batch(&store).await;

    let processing = store.set_batch_status(batch.id, BatchStatus::Processing, None)
                           .await
                           .expect("Pending -> Processing is allowed");
    assert_eq!(processing.status, BatchStatus::Processing);

    let completed = store.set_batch_status(batch.id, BatchStatus::Completed, None)
                          .await
                          .expect("Processing -> Completed is allowed");
    assert_eq!(completed.status, BatchStatus::Completed);
}
