//! `ChemEngine`: the pyo3/RDKit-backed Structure Engine (spec §4.1).
//!
//! Every operation is pure and re-entrant from the Rust side; RDKit itself
//! is not thread-safe across the GIL boundary so all calls take the GIL via
//! `Python::with_gil`, matching the teacher's original `rdkit::mol_weight`.

use std::env;

use chem_domain::{Fingerprint, FingerprintData, FingerprintParameters, FingerprintType};
use dotenvy::dotenv;
use once_cell::sync::Lazy;
use pyo3::prelude::*;
use pyo3::types::PyModule;

use crate::descriptors::MoleculeDescriptors;
use crate::error::EngineError;
use crate::similarity::{self, SimilarityMetric};

const WRAPPER_SOURCE: &str = include_str!("../python/rdkit_wrapper.py");

/// Process-wide engine singleton. Initializes the Python interpreter and
/// validates the wrapper module loads exactly once, the first time any
/// caller touches `ChemEngine::global()`.
pub static ENGINE: Lazy<Result<ChemEngine, EngineError>> = Lazy::new(ChemEngine::init);

pub struct ChemEngine;

impl ChemEngine {
    fn init() -> Result<Self, EngineError> {
        dotenv().ok();
        if let Ok(python_path) = env::var("PYTHON_PATH") {
            env::set_var("PYTHON_SYS_EXECUTABLE", python_path);
        }
        // Fail fast if the wrapper module itself doesn't load, rather than
        // deferring the error to the first real call.
        Python::with_gil(|py| -> PyResult<()> {
            PyModule::from_code(py, WRAPPER_SOURCE, "rdkit_wrapper.py", "rdkit_wrapper")?;
            Ok(())
        })?;
        Ok(ChemEngine)
    }

    pub fn global() -> Result<&'static ChemEngine, EngineError> {
        match &*ENGINE {
            Ok(engine) => Ok(engine),
            Err(e) => Err(clone_engine_error(e)),
        }
    }

    fn with_wrapper<F, R>(&self, f: F) -> Result<R, EngineError>
        where F: FnOnce(Python<'_>, &Bound<'_, PyModule>) -> PyResult<R>
    {
        Python::with_gil(|py| {
            let module = PyModule::from_code(py, WRAPPER_SOURCE, "rdkit_wrapper.py", "rdkit_wrapper")?;
            f(py, &module)
        }).map_err(EngineError::from)
    }

    fn call_str(&self, func: &str, smiles: &str) -> Result<String, EngineError> {
        self.with_wrapper(|_py, m| m.getattr(func)?.call1((smiles,))?.extract())
    }

    fn call_f64(&self, func: &str, smiles: &str) -> Result<f64, EngineError> {
        self.with_wrapper(|_py, m| m.getattr(func)?.call1((smiles,))?.extract())
    }

    pub fn parse_smiles(&self, smiles: &str) -> Result<(), EngineError> {
        if smiles.trim().is_empty() {
            return Err(EngineError::InvalidSmiles("empty SMILES".into()));
        }
        self.with_wrapper(|_py, m| m.getattr("parse_smiles")?.call1((smiles,))?.extract::<bool>())
            .map(|_| ())
            .map_err(|_| EngineError::InvalidSmiles(smiles.to_string()))
    }

    /// `canonicalize(s) -> canonical_smiles`; idempotent per spec §4.1.
    pub fn canonicalize(&self, smiles: &str) -> Result<String, EngineError> {
        self.parse_smiles(smiles)?;
        self.call_str("canonicalize", smiles)
    }

    pub fn inchi(&self, smiles: &str) -> Result<String, EngineError> {
        self.call_str("to_inchi", smiles)
    }

    pub fn inchi_key(&self, smiles: &str) -> Result<String, EngineError> {
        let key = self.call_str("to_inchi_key", smiles)?;
        if key.len() != 27 {
            return Err(EngineError::SanitizationFailed(format!("InChI Key '{key}' is not 27 characters")));
        }
        Ok(key)
    }

    pub fn molecular_formula(&self, smiles: &str) -> Result<String, EngineError> {
        self.call_str("molecular_formula", smiles)
    }

    pub fn molecular_weight(&self, smiles: &str) -> Result<f64, EngineError> {
        self.call_f64("molecular_weight", smiles)
    }

    pub fn exact_mass(&self, smiles: &str) -> Result<f64, EngineError> {
        self.call_f64("exact_mass", smiles)
    }

    pub fn logp(&self, smiles: &str) -> Result<f64, EngineError> {
        self.call_f64("logp", smiles)
    }

    pub fn tpsa(&self, smiles: &str) -> Result<f64, EngineError> {
        self.call_f64("tpsa", smiles)
    }

    /// The bundled descriptor set (spec §4.1: counts, Lipinski violations,
    /// QED, Bertz index, Chi/Kappa indices, Labute ASA, VSA vectors).
    pub fn descriptors(&self, smiles: &str) -> Result<MoleculeDescriptors, EngineError> {
        self.with_wrapper(|py, m| {
                let result = m.getattr("descriptors")?.call1((smiles,))?;
                let get = |key: &str| -> PyResult<f64> { result.get_item(key)?.extract() };
                let get_u32 = |key: &str| -> PyResult<u32> { result.get_item(key)?.extract() };
                let get_vec = |key: &str| -> PyResult<Vec<f64>> { result.get_item(key)?.extract() };
                let _ = py;
                Ok(MoleculeDescriptors { atom_count: get_u32("atom_count")?,
                                         heavy_atom_count: get_u32("heavy_atom_count")?,
                                         ring_count: get_u32("ring_count")?,
                                         rotatable_bond_count: get_u32("rotatable_bond_count")?,
                                         h_donor_count: get_u32("h_donor_count")?,
                                         h_acceptor_count: get_u32("h_acceptor_count")?,
                                         lipinski_violations: get_u32("lipinski_violations")?,
                                         qed: get("qed")?,
                                         bertz_ct: get("bertz_ct")?,
                                         chi0: get("chi0")?,
                                         chi1: get("chi1")?,
                                         kappa1: get("kappa1")?,
                                         kappa2: get("kappa2")?,
                                         kappa3: get("kappa3")?,
                                         labute_asa: get("labute_asa")?,
                                         peoe_vsa: get_vec("peoe_vsa")?,
                                         smr_vsa: get_vec("smr_vsa")? })
            })
    }

    /// `fingerprint(mol, type, params) -> bit vector | sparse int vector`
    /// (spec §4.1). Defaults: Morgan {radius=2, n_bits=2048}; RDKit path
    /// {min_path=1, max_path=7, n_bits=2048}.
    pub fn fingerprint(&self,
                        smiles: &str,
                        fp_type: FingerprintType,
                        params: &FingerprintParameters)
                        -> Result<Fingerprint, EngineError> {
        let type_name = match fp_type {
            FingerprintType::Morgan => "morgan",
            FingerprintType::Rdkit => "rdkit",
            FingerprintType::Maccs => "maccs",
            FingerprintType::Pattern => "pattern",
            FingerprintType::Layered => "layered",
            FingerprintType::AtomPairs => "atom_pairs",
            FingerprintType::Torsion => "torsion",
        };
        let radius = params.radius.unwrap_or(2);
        let n_bits = params.n_bits.unwrap_or(2048);
        let min_path = params.min_path.unwrap_or(1);
        let max_path = params.max_path.unwrap_or(7);

        let data = self.with_wrapper(|py, m| {
                            let result = m.getattr("fingerprint")?
                                          .call1((smiles, type_name, radius, n_bits, min_path, max_path))?;
                            let kind: String = result.get_item("kind")?.extract()?;
                            let _ = py;
                            if kind == "dense" {
                                let n_bits: u32 = result.get_item("n_bits")?.extract()?;
                                let bits: Vec<u32> = result.get_item("bits")?.extract()?;
                                Ok(FingerprintData::dense_from_bits(n_bits, bits))
                            } else {
                                let entries: Vec<(u32, u32)> = result.get_item("entries")?.extract()?;
                                Ok(FingerprintData::Sparse { entries })
                            }
                        })?;

        Ok(Fingerprint { molecule_id: uuid::Uuid::nil(),
                          fingerprint_type: fp_type,
                          parameters: params.clone(),
                          data,
                          created_at: chrono::Utc::now() })
    }

    /// `similarity(fp_a, fp_b, metric) -> [0,1]` (spec §4.1). Pure Rust once
    /// both fingerprints are decoded; `tanimoto` is the default metric.
    pub fn similarity(&self, fp_a: &FingerprintData, fp_b: &FingerprintData, metric: SimilarityMetric) -> f64 {
        similarity::similarity(fp_a, fp_b, metric)
    }

    /// `has_substructure(mol, pattern) -> bool` (spec §4.1). `pattern` is a
    /// SMARTS string.
    pub fn has_substructure(&self, smiles: &str, pattern_smarts: &str) -> Result<bool, EngineError> {
        self.with_wrapper(|_py, m| m.getattr("has_substructure")?.call1((smiles, pattern_smarts))?.extract())
    }
}

fn clone_engine_error(err: &EngineError) -> EngineError {
    match err {
        EngineError::InvalidSmiles(s) => EngineError::InvalidSmiles(s.clone()),
        EngineError::SanitizationFailed(s) => EngineError::SanitizationFailed(s.clone()),
        EngineError::PythonRuntimeError(s) => EngineError::PythonRuntimeError(s.clone()),
        EngineError::UnsupportedFingerprintType(s) => EngineError::UnsupportedFingerprintType(s.clone()),
        EngineError::UnsupportedMetric(s) => EngineError::UnsupportedMetric(s.clone()),
    }
}
