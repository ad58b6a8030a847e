//! API error type and its JSON rendering.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use callsign_auth::{AuthError, TokenError};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Invalid request body: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// JSON error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn token_error_code(err: &TokenError) -> &'static str {
    match err {
        TokenError::Expired => "token_expired",
        TokenError::InvalidSignature => "token_invalid_signature",
        TokenError::MalformedClaims(_) => "token_malformed",
        TokenError::Revoked => "token_revoked",
    }
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorResponse) {
        let (status, error, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone())),
            ApiError::Auth(err) => match err {
                AuthError::Validation(msg) => (
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    Some(msg.clone()),
                ),
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "invalid_credentials", None)
                }
                AuthError::PhoneNumberTaken | AuthError::DuplicatePhoneNumber => {
                    (StatusCode::CONFLICT, "phone_number_taken", None)
                }
                AuthError::InvalidAccessToken(e) | AuthError::InvalidRefreshToken(e) => {
                    (StatusCode::UNAUTHORIZED, token_error_code(e), None)
                }
                AuthError::UserNotFound => (StatusCode::UNAUTHORIZED, "user_not_found", None),
                AuthError::Hashing(_)
                | AuthError::Signing(_)
                | AuthError::Store(_)
                | AuthError::Config(_) => {
                    tracing::error!(error = ?err, "Internal server error");
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
                }
            },
        };
        (status, ErrorResponse { error, details })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use callsign_core::error::CallsignError;

    use super::*;

    fn status_of(err: AuthError) -> (StatusCode, &'static str) {
        let (status, body) = ApiError::from(err).status_and_body();
        (status, body.error)
    }

    #[test]
    fn credentials_and_tokens_are_unauthorized() {
        assert_eq!(
            status_of(AuthError::InvalidCredentials),
            (StatusCode::UNAUTHORIZED, "invalid_credentials")
        );
        assert_eq!(
            status_of(AuthError::InvalidRefreshToken(TokenError::Expired)),
            (StatusCode::UNAUTHORIZED, "token_expired")
        );
        assert_eq!(
            status_of(AuthError::InvalidAccessToken(TokenError::Revoked)),
            (StatusCode::UNAUTHORIZED, "token_revoked")
        );
    }

    #[test]
    fn duplicates_conflict() {
        assert_eq!(status_of(AuthError::PhoneNumberTaken).0, StatusCode::CONFLICT);
        assert_eq!(
            status_of(AuthError::DuplicatePhoneNumber).0,
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let (status, body) =
            ApiError::from(AuthError::Store(CallsignError::Database("secret dsn".into())))
                .status_and_body();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.details.is_none());
    }
}
