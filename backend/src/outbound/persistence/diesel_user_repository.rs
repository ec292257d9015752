//! PostgreSQL-backed `UserRepository` and `UserCountSource` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserCountError, UserCountSource, UserPersistenceError, UserRepository};
use crate::domain::{RegistrationCode, User, UserId};

use super::error_mapping::{DieselFailure, classify_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

const FALLBACK_PATTERN: &str = "ERR-%";

/// Diesel-backed user store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_persistence_error(error: diesel::result::Error, operation: &str) -> UserPersistenceError {
    match classify_diesel_error(error, operation) {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::UniqueViolation(constraint) => UserPersistenceError::duplicate(constraint),
        DieselFailure::Query(message) => UserPersistenceError::query(message),
    }
}

fn map_count_error(error: diesel::result::Error) -> UserCountError {
    match classify_diesel_error(error, "count_users") {
        DieselFailure::Connection(message) => UserCountError::connection(message),
        DieselFailure::UniqueViolation(constraint) => UserCountError::query(constraint),
        DieselFailure::Query(message) => UserCountError::query(message),
    }
}

fn to_domain(row: UserRow) -> Result<User, UserPersistenceError> {
    row.into_domain().map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_persistence_error(err, "insert_user"))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_persistence_error(err, "find_user"))?;

        row.map(to_domain).transpose()
    }

    async fn list_with_fallback_codes(
        &self,
        limit: usize,
    ) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = users::table
            .filter(users::registration_code.like(FALLBACK_PATTERN))
            .order((users::created_at.asc(), users::id.asc()))
            .limit(limit)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_persistence_error(err, "list_fallback_users"))?;

        rows.into_iter().map(to_domain).collect()
    }

    async fn count_with_fallback_codes(&self) -> Result<usize, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let count = users::table
            .filter(users::registration_code.like(FALLBACK_PATTERN))
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(|err| map_persistence_error(err, "count_fallback_users"))?;

        usize::try_from(count).map_err(|err| UserPersistenceError::query(err.to_string()))
    }

    async fn replace_registration_code(
        &self,
        id: &UserId,
        expected: &RegistrationCode,
        replacement: &RegistrationCode,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let updated = diesel::update(
            users::table
                .filter(users::id.eq(id.as_uuid()))
                .filter(users::registration_code.eq(expected.to_string())),
        )
        .set(users::registration_code.eq(replacement.to_string()))
        .execute(&mut conn)
        .await
        .map_err(|err| map_persistence_error(err, "replace_registration_code"))?;

        Ok(updated == 1)
    }
}

#[async_trait]
impl UserCountSource for DieselUserRepository {
    async fn count_users(&self) -> Result<i64, UserCountError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserCountError::connection))?;

        users::table
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(map_count_error)
    }
}
