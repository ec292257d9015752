//! Port for the atomic registration ordinal sequence.
//!
//! Unlike [`super::UserCountSource`], implementations must hand out each
//! ordinal exactly once even under concurrent callers: the increment and the
//! read happen as one operation inside the store.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised when the next ordinal cannot be drawn.
    pub enum RegistrationSequenceError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "registration sequence connection failed: {message}",
        /// Increment statement failed during execution.
        Query { message: String } => "registration sequence query failed: {message}",
    }
}

/// Monotonic, gap-tolerant source of 1-based registration ordinals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationSequence: Send + Sync {
    /// Atomically advance the sequence and return the new ordinal.
    ///
    /// The first call on a fresh store returns `1`. The result always
    /// exceeds the number of stored users, so codes derived from the user
    /// count are never issued twice.
    async fn next_ordinal(&self) -> Result<i64, RegistrationSequenceError>;
}
