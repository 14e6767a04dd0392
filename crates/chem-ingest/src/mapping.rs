//! Column mapping suggestion and validation (spec §4.4 Phases 2-3), grounded
//! on `original_source/csv_parser.py`'s `get_column_mapping_suggestions` /
//! `map_csv_columns` / `validate_csv_columns`.

use std::collections::HashMap;

use chem_domain::PropertyDefinition;

use crate::error::IngestError;

/// Common aliases for the `smiles` column, tried in order.
const SMILES_ALIASES: &[&str] = &["smiles", "structure", "molecule", "mol", "smi", "canonical_smiles"];

/// `column name substring -> property name` heuristics for numeric columns
/// that don't match a `PropertyDefinition` name/display_name directly.
const NUMERIC_ALIASES: &[(&[&str], &str)] = &[(&["weight", "mw"], "molecular_weight"),
                                               (&["logp", "log_p", "log p"], "logp"),
                                               (&["solubility", "sol"], "solubility"),
                                               (&["tpsa", "polar surface", "surface area"], "tpsa"),
                                               (&["mp", "melting", "melting point"], "melting_point"),
                                               (&["ic50", "ic_50", "ic 50"], "ic50"),
                                               (&["ec50", "ec_50", "ec 50"], "ec50")];

/// Proposes a `csv_column -> property_name` mapping for Preview (spec §4.4
/// Phase 2). Case-insensitive; a column is suggested at most once.
pub fn suggest_column_mapping(headers: &[String], definitions: &[PropertyDefinition]) -> HashMap<String, String> {
    let mut suggestions = HashMap::new();
    let lowercase: HashMap<String, &String> = headers.iter().map(|h| (h.to_ascii_lowercase(), h)).collect();

    for alias in SMILES_ALIASES {
        if let Some(header) = lowercase.get(*alias) {
            suggestions.insert((*header).clone(), "smiles".to_string());
            break;
        }
    }

    for def in definitions {
        if def.name == "smiles" || suggestions.values().any(|v| v == &def.name) {
            continue;
        }
        let display_lower = def.display_name.to_ascii_lowercase();
        if let Some(header) = lowercase.get(&display_lower) {
            if !suggestions.contains_key(*header) {
                suggestions.insert((*header).clone(), def.name.clone());
                continue;
            }
        }
        if let Some(header) = lowercase.get(&def.name) {
            if !suggestions.contains_key(*header) {
                suggestions.insert((*header).clone(), def.name.clone());
            }
        }
    }

    for header in headers {
        if suggestions.contains_key(header) {
            continue;
        }
        let lower = header.to_ascii_lowercase();
        if let Some((_, property)) = NUMERIC_ALIASES.iter().find(|(terms, _)| terms.iter().any(|t| lower.contains(t))) {
            suggestions.insert(header.clone(), property.to_string());
        }
    }

    suggestions
}

/// Validates a user-supplied `column_mapping` (spec §4.4 Phase 3).
pub fn validate_mapping(headers: &[String],
                         mapping: &HashMap<String, String>,
                         known_property_names: &[&str])
                         -> Result<(), IngestError> {
    let mut seen_columns = std::collections::HashSet::new();
    for csv_col in mapping.keys() {
        if !headers.contains(csv_col) {
            return Err(IngestError::UnknownCsvColumn(csv_col.clone()));
        }
        if !seen_columns.insert(csv_col) {
            return Err(IngestError::DuplicateCsvColumn(csv_col.clone()));
        }
    }
    if !mapping.values().any(|v| v == "smiles") {
        return Err(IngestError::MissingSmilesMapping);
    }
    for target in mapping.values() {
        if target == "smiles" || target.starts_with("custom_") || known_property_names.contains(&target.as_str()) {
            continue;
        }
        return Err(IngestError::InvalidMappingTarget(target.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chem_domain::constants::seed_property_definitions;

    #[test]
    fn suggests_smiles_from_common_alias() {
        let headers = vec!["Structure".to_string(), "MW".to_string()];
        let defs = seed_property_definitions();
        let suggestions = suggest_column_mapping(&headers, &defs);
        assert_eq!(suggestions.get("Structure"), Some(&"smiles".to_string()));
        assert_eq!(suggestions.get("MW"), Some(&"molecular_weight".to_string()));
    }

    #[test]
    fn suggests_numeric_alias_for_unmatched_header() {
        let headers = vec!["smiles".to_string(), "LogP (calc)".to_string()];
        let defs = seed_property_definitions();
        let suggestions = suggest_column_mapping(&headers, &defs);
        assert_eq!(suggestions.get("LogP (calc)"), Some(&"logp".to_string()));
    }

    #[test]
    fn validate_mapping_requires_smiles_target() {
        let headers = vec!["a".to_string()];
        let mut mapping = HashMap::new();
        mapping.insert("a".to_string(), "logp".to_string());
        assert!(matches!(validate_mapping(&headers, &mapping, &["logp"]), Err(IngestError::MissingSmilesMapping)));
    }

    #[test]
    fn validate_mapping_rejects_unknown_column() {
        let headers = vec!["a".to_string()];
        let mut mapping = HashMap::new();
        mapping.insert("b".to_string(), "smiles".to_string());
        assert!(matches!(validate_mapping(&headers, &mapping, &[]), Err(IngestError::UnknownCsvColumn(_))));
    }

    #[test]
    fn validate_mapping_allows_custom_prefix() {
        let headers = vec!["smiles".to_string(), "notes".to_string()];
        let mut mapping = HashMap::new();
        mapping.insert("smiles".to_string(), "smiles".to_string());
        mapping.insert("notes".to_string(), "custom_notes".to_string());
        assert!(validate_mapping(&headers, &mapping, &[]).is_ok());
    }
}
