//! Error types for the Callsign system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallsignError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CallsignResult<T> = Result<T, CallsignError>;
