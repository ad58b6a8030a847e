//! Database-specific error types and conversions.

use callsign_core::error::CallsignError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated: {entity}.{field}")]
    Duplicate { entity: String, field: String },

    #[error("Concurrent write conflict")]
    Conflict,

    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),
}

impl DbError {
    /// Classify an error returned by a write statement.
    ///
    /// SurrealDB reports unique index violations as "Database index
    /// `<name>` already contains ..."; everything else stays opaque.
    pub(crate) fn from_write(err: surrealdb::Error, entity: &str, field: &str) -> Self {
        if err.to_string().contains("already contains") {
            DbError::Duplicate {
                entity: entity.into(),
                field: field.into(),
            }
        } else {
            DbError::Surreal(err)
        }
    }

    /// Classify an error returned by a guarded (`WHERE`) write.
    ///
    /// Optimistic transactions that touched the same record at the same
    /// time fail at commit with a "read or write conflict" message.
    pub(crate) fn from_conditional_write(err: surrealdb::Error) -> Self {
        if err.to_string().contains("conflict") {
            DbError::Conflict
        } else {
            DbError::Surreal(err)
        }
    }
}

impl From<DbError> for CallsignError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CallsignError::NotFound { entity, id },
            DbError::Duplicate { entity, .. } => CallsignError::AlreadyExists { entity },
            DbError::Corrupt(msg) => CallsignError::Internal(msg),
            other => CallsignError::Database(other.to_string()),
        }
    }
}
