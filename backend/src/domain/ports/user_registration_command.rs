//! Driving port for registering new accounts.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{Error, Role, User};

/// Registration request received from an inbound adapter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    /// Name shown to staff; validated by the service.
    pub display_name: String,
    /// Role granted to the new account.
    pub role: Role,
}

/// Domain use-case port for creating user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRegistrationCommand: Send + Sync {
    /// Register a user and return the stored record, code included.
    async fn register(&self, request: RegisterUserRequest) -> Result<User, Error>;
}
