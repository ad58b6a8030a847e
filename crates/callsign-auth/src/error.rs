//! Authentication error types.

use callsign_core::error::CallsignError;
use thiserror::Error;

/// Why a presented token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token claims are malformed: {0}")]
    MalformedClaims(String),

    /// Cryptographically valid, but no longer the user's current
    /// refresh token.
    #[error("token has been rotated or revoked")]
    Revoked,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown phone number or wrong password. The two are never
    /// distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("phone number is already registered")]
    PhoneNumberTaken,

    /// Lost a concurrent sign-up race for the same phone number.
    #[error("phone number was registered concurrently")]
    DuplicatePhoneNumber,

    #[error("invalid access token")]
    InvalidAccessToken(#[source] TokenError),

    #[error("invalid refresh token")]
    InvalidRefreshToken(#[source] TokenError),

    #[error("user not found")]
    UserNotFound,

    #[error("hashing failure: {0}")]
    Hashing(String),

    #[error("signing failure: {0}")]
    Signing(String),

    #[error("store failure")]
    Store(#[source] CallsignError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AuthError {
    /// The token-level cause, if this error is a token rejection.
    pub fn token_error(&self) -> Option<&TokenError> {
        match self {
            AuthError::InvalidAccessToken(e) | AuthError::InvalidRefreshToken(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CallsignError> for AuthError {
    fn from(err: CallsignError) -> Self {
        AuthError::Store(err)
    }
}
