//! In-process user store for local runs and tests.
//!
//! Implements the same ports as the Diesel adapters. State is lost on
//! restart.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    RegistrationSequence, RegistrationSequenceError, UserCountError, UserCountSource,
    UserPersistenceError, UserRepository,
};
use crate::domain::{RegistrationCode, User, UserId};

#[derive(Debug, Default)]
struct StoreState {
    users: Vec<User>,
    last_ordinal: i64,
}

/// Mutex-guarded user list and registration counter.
///
/// Like the database counter, each ordinal draw first catches up with the
/// number of stored users, so codes issued by the count allocator are never
/// handed out again.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    state: Mutex<StoreState>,
}

impl InMemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `users`.
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                users,
                last_ordinal: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock();
        let users = &mut state.users;
        if users.iter().any(|existing| existing.id() == user.id()) {
            return Err(UserPersistenceError::duplicate(user.id().to_string()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().users.iter().find(|user| user.id() == id).cloned())
    }

    async fn list_with_fallback_codes(
        &self,
        limit: usize,
    ) -> Result<Vec<User>, UserPersistenceError> {
        let mut holders: Vec<User> = self
            .lock()
            .users
            .iter()
            .filter(|user| user.registration_code().is_fallback())
            .cloned()
            .collect();
        holders.sort_by_key(|user| (user.created_at(), *user.id().as_uuid()));
        holders.truncate(limit);
        Ok(holders)
    }

    async fn count_with_fallback_codes(&self) -> Result<usize, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|user| user.registration_code().is_fallback())
            .count())
    }

    async fn replace_registration_code(
        &self,
        id: &UserId,
        expected: &RegistrationCode,
        replacement: &RegistrationCode,
    ) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock();
        let Some(slot) = state
            .users
            .iter_mut()
            .find(|user| user.id() == id && user.registration_code() == expected)
        else {
            return Ok(false);
        };
        let RegistrationCode::Assigned(code) = *replacement else {
            return Err(UserPersistenceError::query(
                "replacement code must be well-formed",
            ));
        };
        *slot = slot
            .reissue_code(code)
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        Ok(true)
    }
}

#[async_trait]
impl UserCountSource for InMemoryUserStore {
    async fn count_users(&self) -> Result<i64, UserCountError> {
        i64::try_from(self.lock().users.len())
            .map_err(|err| UserCountError::query(err.to_string()))
    }
}

#[async_trait]
impl RegistrationSequence for InMemoryUserStore {
    async fn next_ordinal(&self) -> Result<i64, RegistrationSequenceError> {
        let mut state = self.lock();
        let floor = i64::try_from(state.users.len())
            .map_err(|err| RegistrationSequenceError::query(err.to_string()))?;
        state.last_ordinal = state.last_ordinal.max(floor) + 1;
        Ok(state.last_ordinal)
    }
}
