//! Gated integration tests against a real Postgres instance. Skipped (not
//! failed) when `DATABASE_URL` isn't set, matching the teacher's
//! `error_persistence.rs`/`integration_db_persist.rs` pattern.

use chem_domain::{PropertySource, PropertyValue};
use chem_persistence::{build_pool, MoleculeCandidate, MoleculeStore, PgMoleculeStore};
use uuid::Uuid;

fn candidate(smiles: &str, inchi_key: &str, molecular_weight: f64) -> MoleculeCandidate {
    MoleculeCandidate { smiles: smiles.to_string(),
                        inchi_key: inchi_key.to_string(),
                        formula: "C2H6O".to_string(),
                        molecular_weight,
                        basic_properties: vec![("logp".to_string(), PropertyValue::Number(-0.14))] }
}

async fn test_pool() -> Option<sqlx::PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(build_pool(&url, 1, 4).await.expect("failed to build pool against DATABASE_URL"))
}

#[tokio::test]
async fn create_from_smiles_dedups_on_inchi_key() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping create_from_smiles_dedups_on_inchi_key: DATABASE_URL not set");
        return;
    };
    let store = PgMoleculeStore::new(pool);
    let created_by = Uuid::new_v4();
    let inchi_key = format!("TESTDEDUP{}", Uuid::new_v4().simple());

    let first = store.create_from_smiles(candidate("CCO", &inchi_key, 46.07), created_by)
                      .await
                      .expect("first insert should succeed");
    let second = store.create_from_smiles(candidate("CCO", &inchi_key, 46.07), created_by)
                       .await
                       .expect("second insert should return the existing row, not error");

    assert_eq!(first.id, second.id);
    assert_eq!(first.inchi_key, inchi_key);

    let fetched = store.get_by_inchi_key(&inchi_key).await.expect("molecule should exist");
    assert_eq!(fetched.id, first.id);

    let property = store.get_property(first.id, "logp", Some(PropertySource::Calculated))
                         .await
                         .expect("calculated property from the first insert should be present");
    assert!(matches!(property.value, PropertyValue::Number(v) if (v - (-0.14)).abs() < 1e-9));
}

#[tokio::test]
async fn batch_create_dedups_within_a_batch() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping batch_create_dedups_within_a_batch: DATABASE_URL not set");
        return;
    };
    let store = PgMoleculeStore::new(pool);
    let created_by = Uuid::new_v4();
    let inchi_key = format!("TESTBATCHDEDUP{}", Uuid::new_v4().simple());

    let outcome = store.batch_create(vec![candidate("CCO", &inchi_key, 46.07), candidate("CCO", &inchi_key, 46.07)],
                                      created_by)
                        .await;

    assert_eq!(outcome.created.len(), 1);
    assert_eq!(outcome.skipped.len(), 1);
    assert!(outcome.failed.is_empty());
    assert_eq!(outcome.created[0].id, outcome.skipped[0].id);
}

#[tokio::test]
async fn batch_create_isolates_a_failing_row_in_its_own_savepoint() {
    let Some(pool) = test_pool().await else {
        eprintln!("skipping batch_create_isolates_a_failing_row_in_its_own_savepoint: DATABASE_URL not set");
        return;
    };
    let store = PgMoleculeStore::new(pool);
    let created_by = Uuid::new_v4();
    let good_before = format!("TESTGOODA{}", Uuid::new_v4().simple());
    let bad_key = format!("TESTBAD{}", Uuid::new_v4().simple());
    let good_after = format!("TESTGOODB{}", Uuid::new_v4().simple());

    // `molecular_weight >= 0` is a CHECK constraint (migrations/0001_init.sql);
    // a negative weight trips it inside the row's own savepoint without
    // poisoning the outer transaction the other candidates share.
    let candidates =
        vec![candidate("CCO", &good_before, 46.07), candidate("CC(=O)O", &bad_key, -1.0), candidate("CCN", &good_after, 45.08)];

    let outcome = store.batch_create(candidates, created_by).await;

    assert_eq!(outcome.created.len(), 2);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].0, 1);

    let first = store.get_by_inchi_key(&good_before).await;
    let third = store.get_by_inchi_key(&good_after).await;
    assert!(first.is_ok(), "candidate before the failing row must still be committed");
    assert!(third.is_ok(), "candidate after the failing row must still be committed");

    let failed_lookup = store.get_by_inchi_key(&bad_key).await;
    assert!(failed_lookup.is_err(), "the failing candidate's savepoint must have rolled back");
}
