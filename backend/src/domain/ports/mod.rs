//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (storage, sequences, allocators) expose strongly typed
//! errors generated by [`define_port_error`]; driving ports return the
//! transport-agnostic [`crate::domain::Error`].

mod macros;
pub(crate) use macros::define_port_error;

mod registration_code_allocator;
mod registration_reconciliation_command;
mod registration_sequence;
mod user_count_source;
mod user_registration_command;
mod user_repository;

#[cfg(test)]
pub use registration_code_allocator::MockRegistrationCodeAllocator;
pub use registration_code_allocator::RegistrationCodeAllocator;
#[cfg(test)]
pub use registration_reconciliation_command::MockRegistrationReconciliationCommand;
pub use registration_reconciliation_command::{
    ReconciliationReport, RegistrationReconciliationCommand, ReissuedCode,
};
#[cfg(test)]
pub use registration_sequence::MockRegistrationSequence;
pub use registration_sequence::{RegistrationSequence, RegistrationSequenceError};
#[cfg(test)]
pub use user_count_source::MockUserCountSource;
pub use user_count_source::{UserCountError, UserCountSource};
#[cfg(test)]
pub use user_registration_command::MockUserRegistrationCommand;
pub use user_registration_command::{RegisterUserRequest, UserRegistrationCommand};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
