//! `MoleculeProperty` and `PropertyDefinition` (spec §3).
//!
//! The teacher's `MolecularProperty<'a, V, M>` borrowed a `&Molecule` and was
//! generic over the value type. Property rows here must flow through SQL
//! rows and task payloads — across an async boundary a borrow can't survive
//! — so the type is owned and the value is the tagged union declared in
//! spec §3 rather than a type parameter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// Polymorphic property value (spec §3, §9 "runtime-typed property bag").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
}

impl PropertyValue {
    pub fn type_name(&self) -> PropertyType {
        match self {
            PropertyValue::String(_) => PropertyType::String,
            PropertyValue::Integer(_) => PropertyType::Integer,
            PropertyValue::Number(_) => PropertyType::Numeric,
            PropertyValue::Boolean(_) => PropertyType::Boolean,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(v) => Some(*v),
            PropertyValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }
}

/// Provenance of a property value (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertySource {
    Calculated,
    Imported,
    Predicted,
    Experimental,
}

/// A single `(molecule_id, name, source)` property row (invariant I3: within
/// one source only the most recent value is current).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoleculeProperty {
    pub molecule_id: Uuid,
    pub name: String,
    pub source: PropertySource,
    pub value: PropertyValue,
    pub units: Option<String>,
    /// Required when `source == Predicted` (invariant, enforced in `new`).
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl MoleculeProperty {
    pub fn new(molecule_id: Uuid,
               name: impl Into<String>,
               source: PropertySource,
               value: PropertyValue,
               units: Option<String>,
               confidence: Option<f64>,
               now: DateTime<Utc>)
               -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError("property name must not be empty".into()));
        }
        if source == PropertySource::Predicted {
            let c = confidence.ok_or_else(|| {
                               DomainError::ValidationError("predicted properties require a confidence value".into())
                           })?;
            if !(0.0..=1.0).contains(&c) {
                return Err(DomainError::ValidationError("confidence must be in [0,1]".into()));
            }
        }
        Ok(MoleculeProperty { molecule_id, name, source, value, units, confidence, created_at: now })
    }
}

/// Declared type of a property (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    String,
    Numeric,
    Integer,
    Boolean,
}

/// Grouping used for UI/search facets (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCategory {
    Physical,
    Chemical,
    Biological,
    Computational,
    Experimental,
}

/// Catalog entry describing the shape and bounds of a named property
/// (spec §3, invariant I4: if both bounds are set, `min < max`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub property_type: PropertyType,
    pub category: PropertyCategory,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub is_required: bool,
    pub is_filterable: bool,
    pub is_predictable: bool,
}

impl PropertyDefinition {
    pub fn new(name: impl Into<String>,
               display_name: impl Into<String>,
               description: impl Into<String>,
               property_type: PropertyType,
               category: PropertyCategory)
               -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() || name.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(DomainError::ValidationError(format!("property name '{name}' must be non-empty snake_case")));
        }
        Ok(PropertyDefinition { name,
                                display_name: display_name.into(),
                                description: description.into(),
                                property_type,
                                category,
                                min_value: None,
                                max_value: None,
                                is_required: false,
                                is_filterable: true,
                                is_predictable: false })
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Result<Self, DomainError> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo >= hi {
                return Err(DomainError::ValidationError("min_value must be < max_value".into()));
            }
        }
        self.min_value = min;
        self.max_value = max;
        Ok(self)
    }

    pub fn predictable(mut self, value: bool) -> Self {
        self.is_predictable = value;
        self
    }

    pub fn required(mut self, value: bool) -> Self {
        self.is_required = value;
        self
    }

    /// Validates a candidate value against this definition's declared type
    /// and bounds (used by ingestion and `set_property`).
    pub fn validate_value(&self, value: &PropertyValue) -> Result<(), DomainError> {
        let matches_type = matches!((self.property_type, value),
                                     (PropertyType::String, PropertyValue::String(_))
                                     | (PropertyType::Boolean, PropertyValue::Boolean(_))
                                     | (PropertyType::Integer, PropertyValue::Integer(_))
                                     | (PropertyType::Numeric, PropertyValue::Number(_))
                                     | (PropertyType::Numeric, PropertyValue::Integer(_)));
        if !matches_type {
            return Err(DomainError::ValidationError(format!("value for '{}' does not match declared type {:?}",
                                                              self.name, self.property_type)));
        }
        if let Some(n) = value.as_f64() {
            if let Some(min) = self.min_value {
                if n < min {
                    return Err(DomainError::ValidationError(format!("value {n} below minimum {min} for '{}'", self.name)));
                }
            }
            if let Some(max) = self.max_value {
                if n > max {
                    return Err(DomainError::ValidationError(format!("value {n} above maximum {max} for '{}'", self.name)));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicted_property_requires_confidence() {
        let err = MoleculeProperty::new(Uuid::new_v4(),
                                         "logp",
                                         PropertySource::Predicted,
                                         PropertyValue::Number(1.2),
                                         None,
                                         None,
                                         Utc::now());
        assert!(err.is_err());
    }

    #[test]
    fn confidence_out_of_range_rejected() {
        let err = MoleculeProperty::new(Uuid::new_v4(),
                                         "logp",
                                         PropertySource::Predicted,
                                         PropertyValue::Number(1.2),
                                         None,
                                         Some(1.5),
                                         Utc::now());
        assert!(err.is_err());
    }

    #[test]
    fn bounds_require_min_less_than_max() {
        let def = PropertyDefinition::new("mw", "Molecular weight", "", PropertyType::Numeric, PropertyCategory::Physical).unwrap();
        assert!(def.with_bounds(Some(10.0), Some(5.0)).is_err());
    }

    #[test]
    fn validate_value_checks_type_and_range() {
        let def = PropertyDefinition::new("logp", "LogP", "", PropertyType::Numeric, PropertyCategory::Physical).unwrap()
                                                                                                                  .with_bounds(Some(-5.0),
                                                                                                                               Some(10.0))
                                                                                                                  .unwrap();
        assert!(def.validate_value(&PropertyValue::Number(3.0)).is_ok());
        assert!(def.validate_value(&PropertyValue::Number(20.0)).is_err());
        assert!(def.validate_value(&PropertyValue::String("x".into())).is_err());
    }
}
