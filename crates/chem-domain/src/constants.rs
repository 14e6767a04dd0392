//! Cross-cutting limits and the predictable-property catalog (spec §4.4,
//! §4.5, GLOSSARY). Grounded on
//! `original_source/constants/molecule_properties.py`.

use crate::property::{PropertyCategory, PropertyDefinition, PropertyType};

pub const MAX_CSV_SIZE_MB: u64 = 100;
pub const MAX_ROWS: usize = 500_000;
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;
pub const BATCH_INSERT_SIZE: usize = 1_000;
pub const LARGE_FILE_THRESHOLD: usize = 10_000;
pub const ROW_ERROR_REPORT_LIMIT: usize = 1_000;

pub const MAX_PREDICTION_BATCH_SIZE: usize = 100;
pub const PREDICTION_POLL_INTERVAL_S: u64 = 30;
pub const PREDICTION_MAX_WAIT_S: u64 = 300;

/// The enumerated properties for which the external AI service accepts
/// prediction requests (GLOSSARY: "Predictable property set").
pub const PREDICTABLE_PROPERTIES: &[&str] =
    &["logp", "solubility", "permeability", "clearance", "half_life", "bioavailability", "ic50", "ec50",
      "binding_affinity", "pka", "pkb"];

pub fn is_predictable(name: &str) -> bool {
    PREDICTABLE_PROPERTIES.contains(&name)
}

/// Seed catalog of `PropertyDefinition`s for the properties named throughout
/// the spec (GLOSSARY, `original_source/constants/molecule_properties.py`
/// `STANDARD_PROPERTIES`/`PROPERTY_RANGES`). Real deployments load their
/// catalog from the `property_definition` table; this seed is what a fresh
/// store is migrated with.
pub fn seed_property_definitions() -> Vec<PropertyDefinition> {
    let mut defs = Vec::new();
    let physical_numeric = |name: &str, display: &str, min: f64, max: f64| {
        PropertyDefinition::new(name, display, "", PropertyType::Numeric, PropertyCategory::Physical).unwrap()
                                                                                                       .with_bounds(Some(min),
                                                                                                                    Some(max))
                                                                                                       .unwrap()
    };
    defs.push(physical_numeric("molecular_weight", "Molecular Weight", 0.0, 2000.0).required(true));
    defs.push(physical_numeric("exact_mass", "Exact Mass", 0.0, 2000.0));
    defs.push(physical_numeric("logp", "LogP", -10.0, 10.0).predictable(true));
    defs.push(physical_numeric("tpsa", "Polar Surface Area", 0.0, 500.0));
    defs.push(physical_numeric("solubility", "Solubility", 0.0, 1000.0).predictable(true));
    defs.push(physical_numeric("permeability", "Permeability", 0.0, 1.0).predictable(true));
    defs.push(physical_numeric("clearance", "Clearance", 0.0, 1000.0).predictable(true));
    defs.push(physical_numeric("half_life", "Half-life", 0.0, 100.0).predictable(true));
    defs.push(physical_numeric("bioavailability", "Bioavailability", 0.0, 100.0).predictable(true));
    defs.push(physical_numeric("ic50", "IC50", 0.0, 1_000_000.0).predictable(true));
    defs.push(physical_numeric("ec50", "EC50", 0.0, 1_000_000.0).predictable(true));
    defs.push(physical_numeric("binding_affinity", "Binding Affinity", 0.0, 1_000_000.0).predictable(true));
    defs.push(physical_numeric("pka", "pKa", -10.0, 20.0).predictable(true));
    defs.push(physical_numeric("pkb", "pKb", -10.0, 20.0).predictable(true));
    defs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_covers_predictable_set() {
        let defs = seed_property_definitions();
        let predictable_names: Vec<&str> =
            defs.iter().filter(|d| d.is_predictable).map(|d| d.name.as_str()).collect();
        for name in PREDICTABLE_PROPERTIES {
            assert!(predictable_names.contains(name), "missing seed definition for {name}");
        }
    }

    #[test]
    fn is_predictable_matches_list() {
        assert!(is_predictable("logp"));
        assert!(!is_predictable("molecular_weight"));
    }
}
