//! User registration use-case.
//!
//! Validates the request, asks the configured allocator for a code and
//! persists the new account. A fallback code does not fail registration;
//! the reconciliation job reissues it later.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    RegisterUserRequest, RegistrationCodeAllocator, UserPersistenceError, UserRegistrationCommand,
    UserRepository,
};
use crate::domain::{DisplayName, Error, User, UserId, UserValidationError};

/// Map user persistence failures onto domain errors.
pub(crate) fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::Duplicate { message } => {
            Error::internal(format!("duplicate user identifier: {message}"))
        }
    }
}

fn map_validation_error(error: UserValidationError) -> Error {
    let code = match &error {
        UserValidationError::EmptyDisplayName => "empty_display_name",
        UserValidationError::DisplayNameTooShort { .. } => "display_name_too_short",
        UserValidationError::DisplayNameTooLong { .. } => "display_name_too_long",
        UserValidationError::DisplayNameInvalidCharacters => "display_name_invalid_characters",
        UserValidationError::EmptyId
        | UserValidationError::InvalidId
        | UserValidationError::UnknownRole(_)
        | UserValidationError::CodeAlreadyAssigned(_) => "invalid_user",
    };
    Error::invalid_request(error.to_string())
        .with_details(json!({ "field": "displayName", "code": code }))
}

/// Registration service implementing [`UserRegistrationCommand`].
#[derive(Clone)]
pub struct UserRegistrationService<U> {
    users: Arc<U>,
    allocator: Arc<dyn RegistrationCodeAllocator>,
    clock: Arc<dyn Clock>,
}

impl<U> UserRegistrationService<U> {
    /// Create a service persisting through `users` and numbering through
    /// `allocator`.
    pub fn new(
        users: Arc<U>,
        allocator: Arc<dyn RegistrationCodeAllocator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            allocator,
            clock,
        }
    }
}

#[async_trait]
impl<U> UserRegistrationCommand for UserRegistrationService<U>
where
    U: UserRepository,
{
    async fn register(&self, request: RegisterUserRequest) -> Result<User, Error> {
        let display_name = DisplayName::new(request.display_name).map_err(map_validation_error)?;

        let code = self.allocator.next_code().await;
        let user = User::new(
            UserId::random(),
            display_name,
            request.role,
            code,
            self.clock.utc(),
        );

        self.users
            .insert(&user)
            .await
            .map_err(map_persistence_error)?;

        if code.is_fallback() {
            warn!(user_id = %user.id(), %code, "user registered with fallback code");
        } else {
            info!(user_id = %user.id(), role = %user.role(), %code, "user registered");
        }
        Ok(user)
    }
}
