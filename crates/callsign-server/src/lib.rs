//! Callsign Server — HTTP surface over the authentication service.

pub mod config;
pub mod error;
pub mod routes;

use callsign_auth::AuthService;
use callsign_core::repository::UserRepository;

/// Shared application state.
pub struct AppState<U: UserRepository> {
    pub auth: AuthService<U>,
}
