//! Domain primitives, aggregates and use-case services.
//!
//! Purpose: define the registration code encoding, the user aggregate and the
//! services that number new accounts. Keep types immutable and document
//! invariants and serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - AssignedCode / FallbackCode / RegistrationCode: issued codes.
//! - User and its validated parts.
//! - Allocators and the registration/reconciliation services.

pub mod error;
pub mod ports;
pub mod reconciliation_service;
pub mod registration_allocator;
pub mod registration_code;
pub mod registration_service;
pub mod user;

pub use self::error::{Error, ErrorCode};
pub use self::reconciliation_service::{
    DEFAULT_RECONCILE_BATCH, DisabledReconciliation, RegistrationReconciliationService,
};
pub use self::registration_allocator::{
    AllocationStrategy, CountingRegistrationAllocator, SequenceRegistrationAllocator,
    UnknownAllocationStrategy,
};
pub use self::registration_code::{
    AssignedCode, BATCH_SIZE, BatchIndex, FallbackCode, NumericPart, RegistrationCode,
    RegistrationCodeError,
};
pub use self::registration_service::UserRegistrationService;
pub use self::user::{
    DISPLAY_NAME_MAX, DISPLAY_NAME_MIN, DisplayName, Role, User, UserId, UserValidationError,
};

/// Convenient result alias for driving ports.
///
/// # Examples
/// ```
/// use registrar::domain::{DomainResult, Error};
///
/// fn handler() -> DomainResult<()> {
///     Err(Error::service_unavailable("database offline"))
/// }
/// assert!(handler().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
