//! HS256 access/refresh token issuance and verification.
//!
//! Access and refresh tokens share a claims layout but are signed with
//! independent secrets, so a token of one kind never verifies as the
//! other. Verification pins the algorithm to HS256 instead of trusting
//! the `alg` header.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AuthError, TokenError};

/// JWT claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — user ID (UUID string).
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Access,
    Refresh,
}

/// Upper bound for either token lifetime: ten years.
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Clone)]
struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl SigningKey {
    fn new(secret: &str, lifetime_secs: u64) -> Result<Self, AuthError> {
        if lifetime_secs == 0 {
            return Err(AuthError::Config("token lifetimes must be positive".into()));
        }
        if lifetime_secs > MAX_TOKEN_LIFETIME_SECS {
            return Err(AuthError::Config(format!(
                "token lifetime {lifetime_secs}s exceeds {MAX_TOKEN_LIFETIME_SECS}s"
            )));
        }
        let lifetime_secs = i64::try_from(lifetime_secs)
            .map_err(|_| AuthError::Config(format!("token lifetime too large: {lifetime_secs}")))?;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        })
    }
}

/// Issues and validates token pairs. Immutable after construction and
/// safe to share across tasks.
#[derive(Clone)]
pub struct TokenService {
    access: SigningKey,
    refresh: SigningKey,
    issuer: String,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        if config.access_token_secret.is_empty() || config.refresh_token_secret.is_empty() {
            return Err(AuthError::Config("token secrets must not be empty".into()));
        }
        if config.access_token_secret == config.refresh_token_secret {
            return Err(AuthError::Config(
                "access and refresh token secrets must differ".into(),
            ));
        }
        Ok(Self {
            access: SigningKey::new(
                &config.access_token_secret,
                config.access_token_lifetime_secs,
            )?,
            refresh: SigningKey::new(
                &config.refresh_token_secret,
                config.refresh_token_lifetime_secs,
            )?,
            issuer: config.jwt_issuer.clone(),
        })
    }

    /// Access token lifetime in seconds.
    pub fn access_token_lifetime_secs(&self) -> u64 {
        self.access.lifetime_secs.unsigned_abs()
    }

    pub fn issue_pair(&self, subject: &str) -> Result<TokenPair, AuthError> {
        self.issue_pair_at(subject, Utc::now().timestamp())
    }

    /// Issue a pair as if the current time were `now` (Unix seconds).
    pub fn issue_pair_at(&self, subject: &str, now: i64) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue(TokenKind::Access, subject, now)?,
            refresh_token: self.issue(TokenKind::Refresh, subject, now)?,
        })
    }

    /// Verify an access token and return its subject.
    pub fn validate_access(&self, token: &str) -> Result<String, TokenError> {
        self.validate_access_at(token, Utc::now().timestamp())
    }

    pub fn validate_access_at(&self, token: &str, now: i64) -> Result<String, TokenError> {
        self.decode(TokenKind::Access, token, now)
            .map(|claims| claims.sub)
    }

    /// Verify a refresh token and return its subject.
    ///
    /// Purely stateless: whether the token is still the user's current
    /// one is for the caller to check.
    pub fn validate_refresh(&self, token: &str) -> Result<String, TokenError> {
        self.validate_refresh_at(token, Utc::now().timestamp())
    }

    pub fn validate_refresh_at(&self, token: &str, now: i64) -> Result<String, TokenError> {
        self.decode(TokenKind::Refresh, token, now)
            .map(|claims| claims.sub)
    }

    fn key(&self, kind: TokenKind) -> &SigningKey {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    fn issue(&self, kind: TokenKind, subject: &str, now: i64) -> Result<String, AuthError> {
        let key = self.key(kind);
        let exp = now
            .checked_add(key.lifetime_secs)
            .ok_or_else(|| AuthError::Signing(format!("expiry overflows at iat {now}")))?;
        let claims = Claims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            iat: now,
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key.encoding)
            .map_err(|e| AuthError::Signing(format!("JWT encode: {e}")))
    }

    fn decode(&self, kind: TokenKind, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iss"]);
        // Expiry is checked below against `now`, without leeway.
        validation.validate_exp = false;

        let claims = jsonwebtoken::decode::<Claims>(token, &self.key(kind).decoding, &validation)
            .map(|data| data.claims)
            .map_err(classify)?;

        if now >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::MalformedClaims(err.to_string()),
    }
}

/// SHA-256 of a raw token, hex-encoded.
///
/// This is what the user store keeps as `refresh_token_hash`.
pub fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time comparison of two fingerprints.
pub fn fingerprints_match(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
