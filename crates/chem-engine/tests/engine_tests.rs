//! These exercise the real RDKit interpreter through pyo3 and are skipped
//! unless one is available on the machine running the suite (set
//! `PYTHON_PATH` per the README, or rely on `auto-initialize` finding a
//! system Python with RDKit installed).

use chem_domain::{FingerprintParameters, FingerprintType};
use chem_engine::{ChemEngine, SimilarityMetric};

#[test]
#[ignore = "requires a Python interpreter with RDKit installed"]
fn canonicalize_is_idempotent() {
    let engine = ChemEngine::global().expect("engine init");
    let once = engine.canonicalize("CCO").unwrap();
    let twice = engine.canonicalize(&once).unwrap();
    assert_eq!(once, twice);
}

#[test]
#[ignore = "requires a Python interpreter with RDKit installed"]
fn invalid_smiles_is_rejected_not_panicked() {
    let engine = ChemEngine::global().expect("engine init");
    assert!(engine.parse_smiles("").is_err());
    assert!(engine.parse_smiles("not a smiles (((").is_err());
}

#[test]
#[ignore = "requires a Python interpreter with RDKit installed"]
fn inchi_key_is_27_characters() {
    let engine = ChemEngine::global().expect("engine init");
    let key = engine.inchi_key("CCO").unwrap();
    assert_eq!(key.len(), 27);
}

#[test]
#[ignore = "requires a Python interpreter with RDKit installed"]
fn morgan_fingerprint_self_similarity_is_one() {
    let engine = ChemEngine::global().expect("engine init");
    let fp = engine.fingerprint("CCO", FingerprintType::Morgan, &FingerprintParameters::morgan_default()).unwrap();
    let s = engine.similarity(&fp.data, &fp.data, SimilarityMetric::Tanimoto);
    assert_eq!(s, 1.0);
}
