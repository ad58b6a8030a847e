//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account. Signs in by phone number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub display_name: String,
    /// E.164 phone number, unique across users and immutable.
    pub phone_number: String,
    /// Argon2id PHC string. Only ever checked through the hasher.
    pub password_hash: String,
    /// SHA-256 fingerprint of the single refresh token currently valid
    /// for this user. `None` after logout or before any issuance.
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh, not yet persisted user with a random id and no
    /// refresh token.
    pub fn new(display_name: String, phone_number: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            display_name,
            phone_number,
            password_hash,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_refresh_token_hash(&mut self, hash: String) {
        self.refresh_token_hash = Some(hash);
    }

    pub fn clear_refresh_token(&mut self) {
        self.refresh_token_hash = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_has_no_refresh_token() {
        let user = User::new("Ada".into(), "+15551234567".into(), "digest".into());
        assert!(user.refresh_token_hash.is_none());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn new_users_get_distinct_ids() {
        let a = User::new("Ada".into(), "+15551234567".into(), "d".into());
        let b = User::new("Ada".into(), "+15551234567".into(), "d".into());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn refresh_token_can_be_set_and_cleared() {
        let mut user = User::new("Ada".into(), "+15551234567".into(), "d".into());
        user.set_refresh_token_hash("abc".into());
        assert_eq!(user.refresh_token_hash.as_deref(), Some("abc"));
        user.clear_refresh_token();
        assert!(user.refresh_token_hash.is_none());
    }
}
