//! Callsign Auth — credential hashing, access/refresh token issuance
//! and validation, and the sign-up / sign-in / refresh / logout flows.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;
pub mod validation;

pub use config::AuthConfig;
pub use error::{AuthError, TokenError};
pub use service::{AuthService, RefreshOutput, SessionOutput, SignInInput, SignUpInput};
pub use token::{Claims, TokenPair, TokenService};
