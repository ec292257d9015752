//! PostgreSQL-backed `RegistrationSequence` adapter.
//!
//! The counter lives in the single-row `registration_sequence` table. One
//! `UPDATE ... RETURNING` statement increments and reads it, so PostgreSQL's
//! row lock serialises concurrent callers.
//!
//! Accounts numbered by the count allocator never touch the row, so each draw
//! first lifts the counter to the current number of users. Switching from
//! `count` to `sequence` therefore continues after the last counted code.

use async_trait::async_trait;
use diesel::QueryableByName;
use diesel::sql_types::{BigInt, SmallInt};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RegistrationSequence, RegistrationSequenceError};

use super::error_mapping::{DieselFailure, classify_diesel_error, map_pool_error};
use super::pool::DbPool;

const COUNTER_ROW: i16 = 1;

const NEXT_ORDINAL_SQL: &str = concat!(
    "UPDATE registration_sequence ",
    "SET last_ordinal = GREATEST(last_ordinal, (SELECT COUNT(*) FROM users)) + 1 ",
    "WHERE id = $1 ",
    "RETURNING last_ordinal"
);

#[derive(QueryableByName)]
struct OrdinalRow {
    #[diesel(sql_type = BigInt)]
    last_ordinal: i64,
}

/// Diesel-backed registration sequence.
#[derive(Clone)]
pub struct DieselRegistrationSequence {
    pool: DbPool,
}

impl DieselRegistrationSequence {
    /// Create a sequence over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_sequence_error(error: diesel::result::Error) -> RegistrationSequenceError {
    match classify_diesel_error(error, "next_ordinal") {
        DieselFailure::Connection(message) => RegistrationSequenceError::connection(message),
        DieselFailure::UniqueViolation(constraint) => RegistrationSequenceError::query(constraint),
        DieselFailure::Query(message) => RegistrationSequenceError::query(message),
    }
}

#[async_trait]
impl RegistrationSequence for DieselRegistrationSequence {
    async fn next_ordinal(&self) -> Result<i64, RegistrationSequenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RegistrationSequenceError::connection))?;

        diesel::sql_query(NEXT_ORDINAL_SQL)
            .bind::<SmallInt, _>(COUNTER_ROW)
            .get_result::<OrdinalRow>(&mut conn)
            .await
            .map(|row| row.last_ordinal)
            .map_err(map_sequence_error)
    }
}
