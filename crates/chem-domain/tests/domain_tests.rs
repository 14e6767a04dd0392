use chem_domain::{BatchStatus, Library, Molecule, MoleculeProperty, Page, Pagination, Prediction, PredictionBatch,
                  PredictionStatus, PropertySource, PropertyValue};
use chrono::Utc;
use uuid::Uuid;

fn sample_molecule() -> Molecule {
    Molecule::new(Uuid::new_v4(), "CCO", "LFQSCWFLJHTTHZ-UHFFFAOYSA-N", "C2H6O", 46.07, Uuid::new_v4(), Utc::now()).unwrap()
}

#[test]
fn molecule_property_round_trip_through_json() {
    let mol = sample_molecule();
    let prop = MoleculeProperty::new(mol.id,
                                      "logp",
                                      PropertySource::Calculated,
                                      PropertyValue::Number(1.23),
                                      None,
                                      None,
                                      Utc::now()).unwrap();

    let encoded = serde_json::to_string(&prop).unwrap();
    let decoded: MoleculeProperty = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded.molecule_id, mol.id);
    assert_eq!(decoded.value, PropertyValue::Number(1.23));
}

#[test]
fn library_rejects_blank_name() {
    assert!(Library::new(Uuid::new_v4(), "   ", None, Uuid::new_v4(), None, false, Utc::now()).is_err());
}

#[test]
fn library_accepts_trimmed_name() {
    let lib = Library::new(Uuid::new_v4(), "  Kinase Screen  ", None, Uuid::new_v4(), None, true, Utc::now()).unwrap();
    assert_eq!(lib.name, "Kinase Screen");
}

#[test]
fn prediction_batch_lifecycle_follows_allowed_transitions() {
    let mol = sample_molecule();
    let mut batch = PredictionBatch::new(Uuid::new_v4(),
                                          vec![mol.id],
                                          vec!["logp".into(), "solubility".into()],
                                          "admet-v1",
                                          "1.0.0",
                                          Uuid::new_v4(),
                                          Utc::now());
    assert_eq!(batch.total_count, 2);
    assert!(batch.is_consistent());

    assert!(BatchStatus::allowed_transition(batch.status, BatchStatus::Processing));
    batch.status = BatchStatus::Processing;

    batch.completed_count = 1;
    batch.failed_count = 1;
    assert!(BatchStatus::allowed_transition(batch.status, BatchStatus::Completed));
    batch.status = BatchStatus::Completed;
    assert!(batch.is_consistent());

    // A batch may not silently move backwards from a terminal state.
    assert!(!BatchStatus::allowed_transition(batch.status, BatchStatus::Processing));
}

#[test]
fn prediction_carries_pending_status_until_filled_in() {
    let mol = sample_molecule();
    let prediction = Prediction { id: Uuid::new_v4(),
                                   molecule_id: mol.id,
                                   property_name: "logp".into(),
                                   value: None,
                                   confidence: None,
                                   units: None,
                                   model_name: "admet-v1".into(),
                                   model_version: "1.0.0".into(),
                                   status: PredictionStatus::Pending,
                                   error_message: None,
                                   created_at: Utc::now(),
                                   updated_at: Utc::now() };
    assert_eq!(prediction.status, PredictionStatus::Pending);
    assert!(prediction.value.is_none());
}

#[test]
fn page_wraps_items_with_correct_total_pages() {
    let molecules: Vec<Molecule> = (0..3).map(|_| sample_molecule()).collect();
    let page = Page::new(molecules, 125, Pagination::new(2, 50));
    assert_eq!(page.page, 2);
    assert_eq!(page.pages, 3);
    assert_eq!(page.items.len(), 3);
}
