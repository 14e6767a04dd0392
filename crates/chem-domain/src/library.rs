//! `Library`, a user-curated molecule collection (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Library {
    pub fn new(id: Uuid,
               name: impl Into<String>,
               description: Option<String>,
               owner_id: Uuid,
               organization_id: Option<Uuid>,
               is_public: bool,
               now: DateTime<Utc>)
               -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.len() > 100 {
            return Err(DomainError::ValidationError("library name must be 1..100 chars after trim".into()));
        }
        Ok(Library { id,
                     name: trimmed.to_string(),
                     description,
                     owner_id,
                     organization_id,
                     is_public,
                     created_at: now,
                     updated_at: now })
    }
}

/// `library_molecule` edge row — a many-to-many relation modeled as a
/// first-class entity rather than a mutator method on `Library` (spec §9:
/// "remove mutation methods from Library/Molecule").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryMolecule {
    pub library_id: Uuid,
    pub molecule_id: Uuid,
    pub added_by: Uuid,
    pub added_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_name() {
        assert!(Library::new(Uuid::new_v4(), "   ", None, Uuid::new_v4(), None, false, Utc::now()).is_err());
    }

    #[test]
    fn rejects_overlong_name() {
        let name = "x".repeat(101);
        assert!(Library::new(Uuid::new_v4(), name, None, Uuid::new_v4(), None, false, Utc::now()).is_err());
    }

    #[test]
    fn trims_name() {
        let lib = Library::new(Uuid::new_v4(), "  My Library  ", None, Uuid::new_v4(), None, true, Utc::now()).unwrap();
        assert_eq!(lib.name, "My Library");
    }
}
