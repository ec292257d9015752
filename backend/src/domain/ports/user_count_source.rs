//! Port for reading the number of registered accounts.
//!
//! The count-based allocator reads this fresh on every allocation. Adapters
//! report whatever the store believes is current; no snapshot isolation is
//! implied.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised when the user count cannot be read.
    pub enum UserCountError {
        /// Store connection could not be established.
        Connection { message: String } => "user count connection failed: {message}",
        /// Count query failed during execution.
        Query { message: String } => "user count query failed: {message}",
    }
}

/// Source of the current total number of registered users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCountSource: Send + Sync {
    /// Return the total number of user records.
    ///
    /// The value is signed because storage engines report counts that way;
    /// callers must treat negative values as a fault.
    async fn count_users(&self) -> Result<i64, UserCountError>;
}
