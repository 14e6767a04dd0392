//! Molecule Store (C2, spec §4.2).
//!
//! `create_from_smiles`/`batch_create` accept an already-computed
//! `MoleculeCandidate` rather than a raw SMILES string. Structural identity
//! (`inchi_key`, `formula`, `molecular_weight`, basic descriptors) is the
//! Structure Engine's job (C1), and C1 is a `pyo3`-backed crate; keeping
//! that dependency out of the storage layer means a caller (the ingestion
//! pipeline, the CLI) computes the candidate once via `chem-engine` and
//! hands the result here, rather than the store reaching back into RDKit
//! itself.

use async_trait::async_trait;
use chem_domain::{Library, Molecule, MoleculeProperty, MoleculeStatus, Page, Pagination, PropertySource, PropertyValue};
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::rows::{molecule_status_str, property_source_str, LibraryRow, MoleculeRow, PropertyRow};
use crate::PgPool;

/// Structural identity and basic descriptors computed by the Structure
/// Engine, ready to upsert (spec §4.2 step 1-2).
#[derive(Debug, Clone)]
pub struct MoleculeCandidate {
    pub smiles: String,
    pub inchi_key: String,
    pub formula: String,
    pub molecular_weight: f64,
    /// Basic descriptors to persist with `source = CALCULATED` on first
    /// insert only (e.g. `exact_mass`, `logp`, `tpsa`).
    pub basic_properties: Vec<(String, PropertyValue)>,
}

#[derive(Debug, Clone, Default)]
pub struct PropertyRangeFilter {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// `filter(criteria, ...)` predicate (spec §4.2).
#[derive(Debug, Clone, Default)]
pub struct MoleculeFilter {
    pub smiles_contains: Option<String>,
    pub formula_contains: Option<String>,
    pub status: Option<MoleculeStatus>,
    pub created_by: Option<Uuid>,
    pub library_id: Option<Uuid>,
    pub property_ranges: Vec<(String, PropertyRangeFilter)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoleculeSort {
    CreatedAtAsc,
    CreatedAtDesc,
    MolecularWeightAsc,
    MolecularWeightDesc,
}

impl MoleculeSort {
    fn sql(self) -> &'static str {
        match self {
            MoleculeSort::CreatedAtAsc => "m.created_at ASC",
            MoleculeSort::CreatedAtDesc => "m.created_at DESC",
            MoleculeSort::MolecularWeightAsc => "m.molecular_weight ASC",
            MoleculeSort::MolecularWeightDesc => "m.molecular_weight DESC",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchCreateOutcome {
    pub created: Vec<Molecule>,
    pub skipped: Vec<Molecule>,
    pub failed: Vec<(usize, String)>,
}

#[async_trait]
pub trait MoleculeStore: Send + Sync {
    async fn create_from_smiles(&self, candidate: MoleculeCandidate, created_by: Uuid) -> Result<Molecule, PersistenceError>;
    async fn get(&self, id: Uuid) -> Result<Molecule, PersistenceError>;
    async fn get_by_smiles(&self, smiles: &str) -> Result<Molecule, PersistenceError>;
    async fn get_by_inchi_key(&self, key: &str) -> Result<Molecule, PersistenceError>;
    async fn set_property(&self,
                           molecule_id: Uuid,
                           name: &str,
                           value: PropertyValue,
                           source: PropertySource,
                           units: Option<String>,
                           confidence: Option<f64>)
                           -> Result<MoleculeProperty, PersistenceError>;
    async fn get_property(&self,
                          molecule_id: Uuid,
                          name: &str,
                          source: Option<PropertySource>)
                          -> Result<MoleculeProperty, PersistenceError>;
    async fn filter(&self,
                     criteria: MoleculeFilter,
                     pagination: Pagination,
                     sort: MoleculeSort)
                     -> Result<Page<Molecule>, PersistenceError>;
    async fn batch_create(&self, candidates: Vec<MoleculeCandidate>, created_by: Uuid) -> BatchCreateOutcome;
    async fn add_molecule_to_library(&self, library_id: Uuid, molecule_id: Uuid, added_by: Uuid) -> Result<bool, PersistenceError>;
    async fn remove_molecule_from_library(&self, library_id: Uuid, molecule_id: Uuid) -> Result<bool, PersistenceError>;
    async fn get_library_molecules(&self, library_id: Uuid, pagination: Pagination) -> Result<Page<Molecule>, PersistenceError>;
    async fn create_library(&self, library: Library) -> Result<Library, PersistenceError>;
    async fn get_library(&self, id: Uuid) -> Result<Library, PersistenceError>;
}

pub struct PgMoleculeStore {
    pool: PgPool,
}

impl PgMoleculeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_calculated_properties(&self,
                                           tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
                                           molecule_id: Uuid,
                                           properties: &[(String, PropertyValue)])
                                           -> Result<(), PersistenceError> {
        for (name, value) in properties {
            let value_json = serde_json::to_value(value).map_err(|e| PersistenceError::Unknown(e.to_string()))?;
            sqlx::query("INSERT INTO molecule_property (molecule_id, name, source, value, units, confidence) \
                         VALUES ($1, $2, $3, $4, NULL, NULL) \
                         ON CONFLICT (molecule_id, name, source) DO NOTHING")
                .bind(molecule_id)
                .bind(name)
                .bind(property_source_str(PropertySource::Calculated))
                .bind(value_json)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl MoleculeStore for PgMoleculeStore {
    async fn create_from_smiles(&self, candidate: MoleculeCandidate, created_by: Uuid) -> Result<Molecule, PersistenceError> {
        let mut tx = self.pool.begin().await?;
        let id = Uuid::new_v4();
        let row: Option<MoleculeRow> = sqlx::query_as(
            "INSERT INTO molecule (id, smiles, inchi_key, formula, molecular_weight, status, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (inchi_key) DO NOTHING \
             RETURNING id, smiles, inchi_key, formula, molecular_weight, status, attributes, created_by, created_at, updated_at",
        ).bind(id)
         .bind(&candidate.smiles)
         .bind(&candidate.inchi_key)
         .bind(&candidate.formula)
         .bind(candidate.molecular_weight)
         .bind(molecule_status_str(MoleculeStatus::Available))
         .bind(created_by)
         .fetch_optional(&mut *tx)
         .await?;

        let molecule = match row {
            Some(row) => {
                self.insert_calculated_properties(&mut tx, row.id, &candidate.basic_properties).await?;
                Molecule::try_from(row)?
            }
            None => {
                let existing: MoleculeRow = sqlx::query_as(
                    "SELECT id, smiles, inchi_key, formula, molecular_weight, status, attributes, created_by, created_at, updated_at \
                     FROM molecule WHERE inchi_key = $1",
                ).bind(&candidate.inchi_key)
                 .fetch_one(&mut *tx)
                 .await?;
                Molecule::try_from(existing)?
            }
        };
        tx.commit().await?;
        Ok(molecule)
    }

    async fn get(&self, id: Uuid) -> Result<Molecule, PersistenceError> {
        let row: MoleculeRow = sqlx::query_as(
            "SELECT id, smiles, inchi_key, formula, molecular_weight, status, attributes, created_by, created_at, updated_at \
             FROM molecule WHERE id = $1",
        ).bind(id)
         .fetch_one(&self.pool)
         .await?;
        Molecule::try_from(row)
    }

    async fn get_by_smiles(&self, smiles: &str) -> Result<Molecule, PersistenceError> {
        let row: MoleculeRow = sqlx::query_as(
            "SELECT id, smiles, inchi_key, formula, molecular_weight, status, attributes, created_by, created_at, updated_at \
             FROM molecule WHERE smiles = $1",
        ).bind(smiles)
         .fetch_one(&self.pool)
         .await?;
        Molecule::try_from(row)
    }

    async fn get_by_inchi_key(&self, key: &str) -> Result<Molecule, PersistenceError> {
        let row: MoleculeRow = sqlx::query_as(
            "SELECT id, smiles, inchi_key, formula, molecular_weight, status, attributes, created_by, created_at, updated_at \
             FROM molecule WHERE inchi_key = $1",
        ).bind(key)
         .fetch_one(&self.pool)
         .await?;
        Molecule::try_from(row)
    }

    async fn set_property(&self,
                           molecule_id: Uuid,
                           name: &str,
                           value: PropertyValue,
                           source: PropertySource,
                           units: Option<String>,
                           confidence: Option<f64>)
                           -> Result<MoleculeProperty, PersistenceError> {
        let value_json = serde_json::to_value(&value).map_err(|e| PersistenceError::Unknown(e.to_string()))?;
        let row: PropertyRow = sqlx::query_as(
            "INSERT INTO molecule_property (molecule_id, name, source, value, units, confidence) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (molecule_id, name, source) DO UPDATE \
                SET value = EXCLUDED.value, units = EXCLUDED.units, confidence = EXCLUDED.confidence, created_at = now() \
             RETURNING molecule_id, name, source, value, units, confidence, created_at",
        ).bind(molecule_id)
         .bind(name)
         .bind(property_source_str(source))
         .bind(value_json)
         .bind(units)
         .bind(confidence)
         .fetch_one(&self.pool)
         .await?;
        MoleculeProperty::try_from(row)
    }

    async fn get_property(&self,
                          molecule_id: Uuid,
                          name: &str,
                          source: Option<PropertySource>)
                          -> Result<MoleculeProperty, PersistenceError> {
        let row: PropertyRow = match source {
            Some(source) => {
                sqlx::query_as(
                    "SELECT molecule_id, name, source, value, units, confidence, created_at \
                     FROM molecule_property WHERE molecule_id = $1 AND name = $2 AND source = $3",
                ).bind(molecule_id)
                 .bind(name)
                 .bind(property_source_str(source))
                 .fetch_one(&self.pool)
                 .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT molecule_id, name, source, value, units, confidence, created_at \
                     FROM molecule_property WHERE molecule_id = $1 AND name = $2 \
                     ORDER BY created_at DESC LIMIT 1",
                ).bind(molecule_id)
                 .bind(name)
                 .fetch_one(&self.pool)
                 .await?
            }
        };
        MoleculeProperty::try_from(row)
    }

    async fn filter(&self,
                     criteria: MoleculeFilter,
                     pagination: Pagination,
                     sort: MoleculeSort)
                     -> Result<Page<Molecule>, PersistenceError> {
        let mut qb = sqlx::QueryBuilder::new(
            "SELECT DISTINCT m.id, m.smiles, m.inchi_key, m.formula, m.molecular_weight, m.status, m.attributes, \
                    m.created_by, m.created_at, m.updated_at FROM molecule m",
        );
        if criteria.library_id.is_some() {
            qb.push(" JOIN library_molecule lm ON lm.molecule_id = m.id");
        }
        for (idx, _) in criteria.property_ranges.iter().enumerate() {
            qb.push(format!(" JOIN molecule_property pr{idx} ON pr{idx}.molecule_id = m.id"));
        }

        let mut first = true;
        let mut push_clause = |qb: &mut sqlx::QueryBuilder<sqlx::Postgres>, clause: &str| {
            qb.push(if first { " WHERE " } else { " AND " });
            qb.push(clause);
            first = false;
        };

        if let Some(s) = &criteria.smiles_contains {
            push_clause(&mut qb, "m.smiles ILIKE ");
            qb.push_bind(format!("%{s}%"));
        }
        if let Some(f) = &criteria.formula_contains {
            push_clause(&mut qb, "m.formula ILIKE ");
            qb.push_bind(format!("%{f}%"));
        }
        if let Some(status) = criteria.status {
            push_clause(&mut qb, "m.status = ");
            qb.push_bind(molecule_status_str(status));
        }
        if let Some(created_by) = criteria.created_by {
            push_clause(&mut qb, "m.created_by = ");
            qb.push_bind(created_by);
        }
        if let Some(library_id) = criteria.library_id {
            push_clause(&mut qb, "lm.library_id = ");
            qb.push_bind(library_id);
        }
        for (idx, (name, range)) in criteria.property_ranges.iter().enumerate() {
            push_clause(&mut qb, &format!("pr{idx}.name = "));
            qb.push_bind(name.clone());
            if let Some(min) = range.min {
                qb.push(format!(" AND (pr{idx}.value)::text::double precision >= "));
                qb.push_bind(min);
            }
            if let Some(max) = range.max {
                qb.push(format!(" AND (pr{idx}.value)::text::double precision <= "));
                qb.push_bind(max);
            }
        }

        let count_sql = format!("SELECT COUNT(*) FROM ({}) AS filtered", qb.sql());
        let total: i64 = sqlx::query_scalar(&count_sql).fetch_one(&self.pool).await?;

        qb.push(format!(" ORDER BY {} LIMIT ", sort.sql()));
        qb.push_bind(pagination.limit());
        qb.push(" OFFSET ");
        qb.push_bind(pagination.offset());

        let rows: Vec<MoleculeRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let items = rows.into_iter().map(Molecule::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total.max(0) as u64, pagination))
    }

    async fn batch_create(&self, candidates: Vec<MoleculeCandidate>, created_by: Uuid) -> BatchCreateOutcome {
        let mut outcome = BatchCreateOutcome::default();
        let Ok(mut tx) = self.pool.begin().await else {
            outcome.failed = candidates.into_iter().enumerate().map(|(i, _)| (i, "failed to open transaction".to_string())).collect();
            return outcome;
        };

        for (index, candidate) in candidates.into_iter().enumerate() {
            let attempt = async {
                let mut savepoint = tx.begin().await?;
                let id = Uuid::new_v4();
                let row: Option<MoleculeRow> = sqlx::query_as(
                    "INSERT INTO molecule (id, smiles, inchi_key, formula, molecular_weight, status, created_by) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7) \
                     ON CONFLICT (inchi_key) DO NOTHING \
                     RETURNING id, smiles, inchi_key, formula, molecular_weight, status, attributes, created_by, created_at, updated_at",
                ).bind(id)
                 .bind(&candidate.smiles)
                 .bind(&candidate.inchi_key)
                 .bind(&candidate.formula)
                 .bind(candidate.molecular_weight)
                 .bind(molecule_status_str(MoleculeStatus::Available))
                 .bind(created_by)
                 .fetch_optional(&mut *savepoint)
                 .await?;

                let (molecule, was_created) = match row {
                    Some(row) => {
                        for (name, value) in &candidate.basic_properties {
                            let value_json = serde_json::to_value(value).map_err(|e| PersistenceError::Unknown(e.to_string()))?;
                            sqlx::query("INSERT INTO molecule_property (molecule_id, name, source, value) \
                                         VALUES ($1, $2, $3, $4) ON CONFLICT (molecule_id, name, source) DO NOTHING")
                                .bind(row.id)
                                .bind(name)
                                .bind(property_source_str(PropertySource::Calculated))
                                .bind(value_json)
                                .execute(&mut *savepoint)
                                .await?;
                        }
                        (Molecule::try_from(row)?, true)
                    }
                    None => {
                        let existing: MoleculeRow = sqlx::query_as(
                            "SELECT id, smiles, inchi_key, formula, molecular_weight, status, attributes, created_by, created_at, updated_at \
                             FROM molecule WHERE inchi_key = $1",
                        ).bind(&candidate.inchi_key)
                         .fetch_one(&mut *savepoint)
                         .await?;
                        (Molecule::try_from(existing)?, false)
                    }
                };
                savepoint.commit().await?;
                Ok::<(Molecule, bool), PersistenceError>((molecule, was_created))
            }.await;

            match attempt {
                Ok((molecule, true)) => outcome.created.push(molecule),
                Ok((molecule, false)) => outcome.skipped.push(molecule),
                Err(e) => outcome.failed.push((index, e.to_string())),
            }
        }

        if let Err(e) = tx.commit().await {
            log::error!("batch_create: outer transaction commit failed: {e}");
        }
        outcome
    }

    async fn add_molecule_to_library(&self, library_id: Uuid, molecule_id: Uuid, added_by: Uuid) -> Result<bool, PersistenceError> {
        let result = sqlx::query(
            "INSERT INTO library_molecule (library_id, molecule_id, added_by) VALUES ($1, $2, $3) \
             ON CONFLICT (library_id, molecule_id) DO NOTHING",
        ).bind(library_id)
         .bind(molecule_id)
         .bind(added_by)
         .execute(&self.pool)
         .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_molecule_from_library(&self, library_id: Uuid, molecule_id: Uuid) -> Result<bool, PersistenceError> {
        let result = sqlx::query("DELETE FROM library_molecule WHERE library_id = $1 AND molecule_id = $2")
            .bind(library_id)
            .bind(molecule_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_library_molecules(&self, library_id: Uuid, pagination: Pagination) -> Result<Page<Molecule>, PersistenceError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM library_molecule WHERE library_id = $1")
            .bind(library_id)
            .fetch_one(&self.pool)
            .await?;
        let rows: Vec<MoleculeRow> = sqlx::query_as(
            "SELECT m.id, m.smiles, m.inchi_key, m.formula, m.molecular_weight, m.status, m.attributes, \
                    m.created_by, m.created_at, m.updated_at \
             FROM molecule m JOIN library_molecule lm ON lm.molecule_id = m.id \
             WHERE lm.library_id = $1 ORDER BY lm.added_at ASC LIMIT $2 OFFSET $3",
        ).bind(library_id)
         .bind(pagination.limit())
         .bind(pagination.offset())
         .fetch_all(&self.pool)
         .await?;
        let items = rows.into_iter().map(Molecule::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total.max(0) as u64, pagination))
    }

    async fn create_library(&self, library: Library) -> Result<Library, PersistenceError> {
        let row: LibraryRow = sqlx::query_as(
            "INSERT INTO library (id, name, description, owner_id, organization_id, is_public) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, name, description, owner_id, organization_id, is_public, created_at, updated_at",
        ).bind(library.id)
         .bind(&library.name)
         .bind(&library.description)
         .bind(library.owner_id)
         .bind(library.organization_id)
         .bind(library.is_public)
         .fetch_one(&self.pool)
         .await?;
        Ok(row.into())
    }

    async fn get_library(&self, id: Uuid) -> Result<Library, PersistenceError> {
        let row: LibraryRow = sqlx::query_as(
            "SELECT id, name, description, owner_id, organization_id, is_public, created_at, updated_at \
             FROM library WHERE id = $1",
        ).bind(id)
         .fetch_one(&self.pool)
         .await?;
        Ok(row.into())
    }
}
