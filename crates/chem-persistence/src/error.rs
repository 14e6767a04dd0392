//! Persistence errors. Maps `sqlx`/Postgres errors to semantic variants
//! (spec §7: `DatabaseError`, conflict kinds, not-found).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("unique violation: {0}")]
    UniqueViolation(String),
    #[error("check violation: {0}")]
    CheckViolation(String),
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),
    #[error("not found")]
    NotFound,
    #[error("serialization conflict (retryable)")]
    SerializationConflict,
    #[error("transient IO / connection pool error: {0}")]
    TransientIo(String),
    #[error("invalid property value: {0}")]
    InvalidPropertyValue(String),
    #[error("unknown database error: {0}")]
    Unknown(String),
}

impl PersistenceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, PersistenceError::SerializationConflict | PersistenceError::TransientIo(_))
    }

    /// Promotes this error to the stable cross-boundary taxonomy (spec §7).
    pub fn to_core_error(&self) -> chem_domain::CoreError {
        use chem_domain::ErrorKind;
        let kind = match self {
            PersistenceError::UniqueViolation(_) => ErrorKind::DuplicateMolecule,
            PersistenceError::CheckViolation(_) | PersistenceError::InvalidPropertyValue(_) => ErrorKind::InvalidPropertyValue,
            PersistenceError::ForeignKeyViolation(_) | PersistenceError::SerializationConflict | PersistenceError::Unknown(_) => {
                ErrorKind::DatabaseError
            }
            PersistenceError::NotFound => ErrorKind::MoleculeNotFound,
            PersistenceError::TransientIo(_) => ErrorKind::ConnectionFailed,
        };
        chem_domain::CoreError::new(kind, self.to_string())
    }
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => PersistenceError::NotFound,
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => PersistenceError::UniqueViolation(db_err.message().to_string()),
                Some("23514") => PersistenceError::CheckViolation(db_err.message().to_string()),
                Some("23503") => PersistenceError::ForeignKeyViolation(db_err.message().to_string()),
                Some("40001") => PersistenceError::SerializationConflict,
                _ => PersistenceError::Unknown(db_err.message().to_string()),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => PersistenceError::TransientIo(err.to_string()),
            other => PersistenceError::Unknown(other.to_string()),
        }
    }
}

impl From<chem_domain::DomainError> for PersistenceError {
    fn from(err: chem_domain::DomainError) -> Self {
        PersistenceError::InvalidPropertyValue(err.to_string())
    }
}
