//! Registered school accounts.
//!
//! A [`User`] is created once at registration with the code issued by the
//! allocator. The code is immutable afterwards with one exception: a
//! fallback placeholder may be swapped for a well-formed code by
//! reconciliation.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::registration_code::{AssignedCode, RegistrationCode};

/// Minimum allowed length for a display name.
pub const DISPLAY_NAME_MIN: usize = 3;
/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 32;

/// Validation errors raised by user constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifier was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// Identifier was not a canonical UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// Display name was blank.
    #[error("display name must not be empty")]
    EmptyDisplayName,
    /// Display name shorter than [`DISPLAY_NAME_MIN`].
    #[error("display name must be at least {min} characters")]
    DisplayNameTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// Display name longer than [`DISPLAY_NAME_MAX`].
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Display name contained characters outside the allowed set.
    #[error("display name may only contain letters, numbers, spaces, or underscores")]
    DisplayNameInvalidCharacters,
    /// Role label did not name a known role.
    #[error("unknown role `{0}`")]
    UnknownRole(String),
    /// Attempted to replace a code that was issued normally.
    #[error("registration code {0} is already assigned and cannot be replaced")]
    CodeAlreadyAssigned(String),
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its hyphenated string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, e.g. one read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

/// Human readable display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

static DISPLAY_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn display_name_regex() -> &'static Regex {
    DISPLAY_NAME_RE.get_or_init(|| {
        // Length is checked separately; this only constrains the alphabet.
        Regex::new("^[A-Za-z0-9_ ]+$")
            .unwrap_or_else(|error| panic!("display name regex failed to compile: {error}"))
    })
}

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }

        let length = display_name.chars().count();
        if length < DISPLAY_NAME_MIN {
            return Err(UserValidationError::DisplayNameTooShort {
                min: DISPLAY_NAME_MIN,
            });
        }
        if length > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        if !display_name_regex().is_match(&display_name) {
            return Err(UserValidationError::DisplayNameInvalidCharacters);
        }

        Ok(Self(display_name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Account role within the school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Enrolled learner.
    Student,
    /// Teaching staff.
    Teacher,
    /// Parent or guardian of a student.
    Parent,
    /// School administrator.
    Admin,
}

impl Role {
    /// Stable lowercase label used in storage and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Parent => "parent",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            "parent" => Ok(Self::Parent),
            "admin" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Registered account.
///
/// ## Invariants
/// - `registration_code` is fixed at creation unless it is a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    display_name: DisplayName,
    role: Role,
    registration_code: RegistrationCode,
    created_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user from validated parts.
    pub fn new(
        id: UserId,
        display_name: DisplayName,
        role: Role,
        registration_code: RegistrationCode,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            display_name,
            role,
            registration_code,
            created_at,
        }
    }

    /// Replace a fallback code with a well-formed one.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use registrar::domain::{
    ///     AssignedCode, DisplayName, FallbackCode, Role, User, UserId,
    /// };
    ///
    /// let now = Utc::now();
    /// let user = User::new(
    ///     UserId::random(),
    ///     DisplayName::new("Grace Hopper").expect("valid name"),
    ///     Role::Teacher,
    ///     FallbackCode::new(now).into(),
    ///     now,
    /// );
    /// let fixed = user.reissue_code(AssignedCode::for_count(0)).expect("fallback replaced");
    /// assert_eq!(fixed.registration_code().to_string(), "1A");
    /// ```
    pub fn reissue_code(&self, code: AssignedCode) -> Result<Self, UserValidationError> {
        if let RegistrationCode::Assigned(existing) = self.registration_code {
            return Err(UserValidationError::CodeAlreadyAssigned(
                existing.to_string(),
            ));
        }
        Ok(Self {
            registration_code: code.into(),
            ..self.clone()
        })
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name shown to staff.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Role the account was registered with.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Code issued at registration.
    pub fn registration_code(&self) -> &RegistrationCode {
        &self.registration_code
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
