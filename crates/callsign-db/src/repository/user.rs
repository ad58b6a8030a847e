//! SurrealDB implementation of [`UserRepository`].
//!
//! The user's UUID is the record key. Phone number uniqueness is
//! enforced by `idx_user_phone_number`, so a lost sign-up race shows
//! up here as [`DbError::Duplicate`] rather than in the caller's
//! earlier lookup.

use callsign_core::error::CallsignResult;
use callsign_core::models::user::User;
use callsign_core::repository::UserRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;

const USER_PROJECTION: &str = "meta::id(id) AS record_id, display_name, phone_number, \
     password_hash, refresh_token_hash, created_at, updated_at";

/// DB-side row struct; the record key comes back via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    display_name: String,
    phone_number: String,
    password_hash: String,
    refresh_token_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("user key is not a UUID: {e}")))?;
        Ok(User {
            id,
            display_name: self.display_name,
            phone_number: self.phone_number,
            password_hash: self.password_hash,
            refresh_token_hash: self.refresh_token_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_one(
        &self,
        query: String,
        binding: (&'static str, String),
        not_found_id: String,
    ) -> CallsignResult<User> {
        let mut result = self
            .db
            .query(query)
            .bind(binding)
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: not_found_id,
        })?;

        Ok(row.try_into_user()?)
    }

    async fn exists(&self, id_str: &str) -> CallsignResult<bool> {
        let mut result = self
            .db
            .query("SELECT VALUE meta::id(id) FROM type::record('user', $id)")
            .bind(("id", id_str.to_string()))
            .await
            .map_err(DbError::from)?;
        let ids: Vec<String> = result.take(0).map_err(DbError::from)?;
        Ok(!ids.is_empty())
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn save(&self, user: &User) -> CallsignResult<()> {
        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 display_name = $display_name, \
                 phone_number = $phone_number, \
                 password_hash = $password_hash, \
                 refresh_token_hash = $refresh_token_hash, \
                 created_at = $created_at, \
                 updated_at = $updated_at",
            )
            .bind(("id", user.id.to_string()))
            .bind(("display_name", user.display_name.clone()))
            .bind(("phone_number", user.phone_number.clone()))
            .bind(("password_hash", user.password_hash.clone()))
            .bind(("refresh_token_hash", user.refresh_token_hash.clone()))
            .bind(("created_at", user.created_at))
            .bind(("updated_at", user.updated_at))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_write(e, "user", "phone_number"))?;

        Ok(())
    }

    async fn update(&self, user: &User) -> CallsignResult<()> {
        let id_str = user.id.to_string();

        // Phone number is immutable and deliberately not written here.
        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 display_name = $display_name, \
                 password_hash = $password_hash, \
                 refresh_token_hash = $refresh_token_hash, \
                 updated_at = time::now() \
                 RETURN VALUE meta::id(id)",
            )
            .bind(("id", id_str.clone()))
            .bind(("display_name", user.display_name.clone()))
            .bind(("password_hash", user.password_hash.clone()))
            .bind(("refresh_token_hash", user.refresh_token_hash.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let updated: Vec<String> = result.take(0).map_err(DbError::from)?;
        if updated.is_empty() {
            return Err(DbError::NotFound {
                entity: "user".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn replace_refresh_token_hash(
        &self,
        id: Uuid,
        expected: &str,
        replacement: &str,
    ) -> CallsignResult<bool> {
        let id_str = id.to_string();

        // The WHERE guard and the write happen in the same statement, so
        // of two callers presenting the same fingerprint only one matches.
        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 refresh_token_hash = $replacement, \
                 updated_at = time::now() \
                 WHERE refresh_token_hash = $expected \
                 RETURN VALUE meta::id(id)",
            )
            .bind(("id", id_str.clone()))
            .bind(("expected", expected.to_string()))
            .bind(("replacement", replacement.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = match result.check() {
            Ok(result) => result,
            Err(e) => match DbError::from_conditional_write(e) {
                DbError::Conflict => {
                    debug!(user_id = %id_str, "Refresh token swap lost a write conflict");
                    return Ok(false);
                }
                other => return Err(other.into()),
            },
        };

        let updated: Vec<String> = result.take(0).map_err(DbError::from)?;
        if !updated.is_empty() {
            return Ok(true);
        }

        if self.exists(&id_str).await? {
            Ok(false)
        } else {
            Err(DbError::NotFound {
                entity: "user".into(),
                id: id_str,
            }
            .into())
        }
    }

    async fn find_by_id(&self, id: Uuid) -> CallsignResult<User> {
        let id_str = id.to_string();
        self.find_one(
            format!("SELECT {USER_PROJECTION} FROM type::record('user', $id)"),
            ("id", id_str.clone()),
            id_str,
        )
        .await
    }

    async fn find_by_phone_number(&self, phone_number: &str) -> CallsignResult<User> {
        self.find_one(
            format!("SELECT {USER_PROJECTION} FROM user WHERE phone_number = $phone_number"),
            ("phone_number", phone_number.to_string()),
            format!("phone_number={phone_number}"),
        )
        .await
    }
}
