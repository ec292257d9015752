//! Driven port for issuing registration codes.
//!
//! Allocation never fails from the caller's point of view: when numbering
//! cannot be derived the allocator returns a fallback code and records the
//! degradation in the logs.

use async_trait::async_trait;

use crate::domain::RegistrationCode;

/// Issues the code for the next account about to be created.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationCodeAllocator: Send + Sync {
    /// Produce the next registration code.
    async fn next_code(&self) -> RegistrationCode;
}
