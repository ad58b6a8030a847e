//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations must make
//! `save` and `update` atomic for a single record; no cross-record
//! transactions are required by callers.

use uuid::Uuid;

use crate::error::CallsignResult;
use crate::models::user::User;

pub trait UserRepository: Send + Sync {
    /// Persist a new user.
    ///
    /// Fails with `AlreadyExists` when the phone number is already
    /// registered. The store's uniqueness constraint is authoritative.
    fn save(&self, user: &User) -> impl Future<Output = CallsignResult<()>> + Send;

    /// Overwrite the mutable fields of an existing user.
    ///
    /// Fails with `NotFound` when no user has `user.id`.
    fn update(&self, user: &User) -> impl Future<Output = CallsignResult<()>> + Send;

    /// Swap the stored refresh token fingerprint from `expected` to
    /// `replacement` in one conditional write.
    ///
    /// Returns `false` when the stored fingerprint is no longer
    /// `expected` (rotated or cleared meanwhile) and nothing was written.
    /// Fails with `NotFound` when no user has `id`.
    fn replace_refresh_token_hash(
        &self,
        id: Uuid,
        expected: &str,
        replacement: &str,
    ) -> impl Future<Output = CallsignResult<bool>> + Send;

    fn find_by_id(&self, id: Uuid) -> impl Future<Output = CallsignResult<User>> + Send;

    fn find_by_phone_number(
        &self,
        phone_number: &str,
    ) -> impl Future<Output = CallsignResult<User>> + Send;
}
