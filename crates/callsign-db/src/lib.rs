//! Callsign Database — SurrealDB connection management and the
//! persistent [`UserRepository`](callsign_core::repository::UserRepository).
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`]); a manager is
//!   only handed out after migrations ran
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Repository implementations ([`repository`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbCredentials, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
