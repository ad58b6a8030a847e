//! Authentication service — sign-up, sign-in, refresh and logout.
//!
//! Every successful sign-up, sign-in and refresh stores the
//! fingerprint of the refresh token it hands out, replacing the
//! previous one. A refresh token is only accepted while it is still
//! the stored one, so each can be used exactly once and logout revokes
//! whatever is outstanding.

use callsign_core::error::CallsignError;
use callsign_core::models::user::User;
use callsign_core::repository::UserRepository;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::AuthConfig;
use crate::error::{AuthError, TokenError};
use crate::password::CredentialHasher;
use crate::token::{self, TokenPair, TokenService};
use crate::validation;

/// Input for the sign-up flow.
#[derive(Debug, Validate)]
pub struct SignUpInput {
    #[validate(length(min = 1, max = 32))]
    pub display_name: String,
    #[validate(custom(function = "validation::validate_e164"))]
    pub phone_number: String,
    #[validate(length(min = 8, max = 72))]
    pub password: String,
}

/// Input for the sign-in flow.
#[derive(Debug, Validate)]
pub struct SignInInput {
    #[validate(custom(function = "validation::validate_e164"))]
    pub phone_number: String,
    #[validate(length(min = 8, max = 72))]
    pub password: String,
}

/// Result of a sign-up or sign-in.
#[derive(Debug)]
pub struct SessionOutput {
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Result of a refresh (new token pair).
#[derive(Debug)]
pub struct RefreshOutput {
    pub access_token: String,
    /// Replaces the consumed refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate. Holds no per-request state.
pub struct AuthService<U: UserRepository> {
    users: U,
    hasher: CredentialHasher,
    tokens: TokenService,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(users: U, config: &AuthConfig) -> Result<Self, AuthError> {
        Ok(Self {
            users,
            hasher: CredentialHasher::new(config.pepper.clone())?,
            tokens: TokenService::new(config)?,
        })
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new user and issue their first token pair.
    pub async fn sign_up(&self, input: SignUpInput) -> Result<SessionOutput, AuthError> {
        validation::check(&input)?;

        // 1. Reject known phone numbers up front.
        match self.users.find_by_phone_number(&input.phone_number).await {
            Ok(_) => return Err(AuthError::PhoneNumberTaken),
            Err(CallsignError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        // 2. Hash off the async workers.
        let password_hash = self.hasher.hash_blocking(input.password).await?;

        // 3. Issue tokens for the new identity.
        let mut user = User::new(input.display_name, input.phone_number, password_hash);
        let pair = self.tokens.issue_pair(&user.id.to_string())?;
        user.set_refresh_token_hash(token::fingerprint(&pair.refresh_token));

        // 4. Persist. The unique index settles races the lookup in
        //    step 1 cannot see.
        self.users.save(&user).await.map_err(|e| match e {
            CallsignError::AlreadyExists { .. } => AuthError::DuplicatePhoneNumber,
            other => other.into(),
        })?;

        info!(user_id = %user.id, "User signed up");

        Ok(self.session_output(user.id, pair))
    }

    /// Authenticate by phone number and password.
    ///
    /// Issues a full pair and rotates the stored refresh token, so a
    /// previously issued refresh token stops working.
    pub async fn sign_in(&self, input: SignInInput) -> Result<SessionOutput, AuthError> {
        validation::check(&input)?;

        // 1. Look up user. Unknown numbers are indistinguishable from
        //    wrong passwords.
        let user = match self.users.find_by_phone_number(&input.phone_number).await {
            Ok(user) => user,
            Err(CallsignError::NotFound { .. }) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        // 2. Verify password.
        let valid = self
            .hasher
            .verify_blocking(input.password, user.password_hash.clone())
            .await?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        // 3. Issue and store a fresh pair.
        let (user, pair) = self.rotate(user).await?;

        info!(user_id = %user.id, "User signed in");

        Ok(self.session_output(user.id, pair))
    }

    /// Exchange the current refresh token for a new pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutput, AuthError> {
        // 1. Stateless checks: signature, algorithm, expiry, subject.
        let subject = self
            .tokens
            .validate_refresh(refresh_token)
            .map_err(AuthError::InvalidRefreshToken)?;
        let user_id = parse_subject(&subject).map_err(AuthError::InvalidRefreshToken)?;

        // 2. Look up user.
        let user = self.load_user(user_id).await?;

        // 3. Must still be the stored token: not rotated away, not
        //    cleared by logout.
        let presented = token::fingerprint(refresh_token);
        let is_current = user
            .refresh_token_hash
            .as_deref()
            .is_some_and(|stored| token::fingerprints_match(stored, &presented));
        if !is_current {
            warn!(user_id = %user.id, "Rejected stale or revoked refresh token");
            return Err(AuthError::InvalidRefreshToken(TokenError::Revoked));
        }

        // 4. Consume it. The swap only lands while the stored fingerprint
        //    is still the presented one, so a concurrent refresh with the
        //    same token gets exactly one winner.
        let pair = self.tokens.issue_pair(&subject)?;
        let swapped = self
            .users
            .replace_refresh_token_hash(
                user.id,
                &presented,
                &token::fingerprint(&pair.refresh_token),
            )
            .await
            .map_err(|e| match e {
                CallsignError::NotFound { .. } => AuthError::UserNotFound,
                other => other.into(),
            })?;
        if !swapped {
            warn!(user_id = %user.id, "Refresh token was consumed concurrently");
            return Err(AuthError::InvalidRefreshToken(TokenError::Revoked));
        }

        info!(user_id = %user.id, "Refresh token rotated");

        Ok(RefreshOutput {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: self.tokens.access_token_lifetime_secs(),
        })
    }

    /// Revoke the caller's refresh token.
    pub async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        let subject = self
            .tokens
            .validate_access(access_token)
            .map_err(AuthError::InvalidAccessToken)?;
        let user_id = parse_subject(&subject).map_err(AuthError::InvalidAccessToken)?;

        let mut user = self.load_user(user_id).await?;
        user.clear_refresh_token();
        self.persist(&user).await?;

        info!(user_id = %user.id, "User logged out");

        Ok(())
    }

    async fn load_user(&self, id: Uuid) -> Result<User, AuthError> {
        self.users.find_by_id(id).await.map_err(|e| match e {
            CallsignError::NotFound { .. } => AuthError::UserNotFound,
            other => other.into(),
        })
    }

    async fn persist(&self, user: &User) -> Result<(), AuthError> {
        self.users.update(user).await.map_err(|e| match e {
            CallsignError::NotFound { .. } => AuthError::UserNotFound,
            other => other.into(),
        })
    }

    /// Issue a new pair and make its refresh token the only valid one.
    async fn rotate(&self, mut user: User) -> Result<(User, TokenPair), AuthError> {
        let pair = self.tokens.issue_pair(&user.id.to_string())?;
        user.set_refresh_token_hash(token::fingerprint(&pair.refresh_token));
        self.persist(&user).await?;
        Ok((user, pair))
    }

    fn session_output(&self, user_id: Uuid, pair: TokenPair) -> SessionOutput {
        SessionOutput {
            user_id,
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: self.tokens.access_token_lifetime_secs(),
        }
    }
}

fn parse_subject(subject: &str) -> Result<Uuid, TokenError> {
    Uuid::parse_str(subject)
        .map_err(|e| TokenError::MalformedClaims(format!("subject is not a user id: {e}")))
}
