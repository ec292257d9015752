//! Port for persisting registered users.

use async_trait::async_trait;

use crate::domain::{RegistrationCode, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A user with the same identifier already exists.
        Duplicate { message: String } => "user already exists: {message}",
    }
}

/// Storage for registered users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a newly registered user.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// List users still holding fallback codes, oldest first.
    async fn list_with_fallback_codes(
        &self,
        limit: usize,
    ) -> Result<Vec<User>, UserPersistenceError>;

    /// Count users still holding fallback codes.
    async fn count_with_fallback_codes(&self) -> Result<usize, UserPersistenceError>;

    /// Overwrite the stored code of `id`.
    ///
    /// Implementations only replace the code when it still equals
    /// `expected`, returning `false` when another writer got there first.
    async fn replace_registration_code(
        &self,
        id: &UserId,
        expected: &RegistrationCode,
        replacement: &RegistrationCode,
    ) -> Result<bool, UserPersistenceError>;
}
