//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{DisplayName, RegistrationCode, Role, User, UserId};

use super::schema::users;

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub role: String,
    pub registration_code: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub role: &'static str,
    pub registration_code: String,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            display_name: user.display_name().as_ref(),
            role: user.role().as_str(),
            registration_code: user.registration_code().to_string(),
            created_at: user.created_at(),
        }
    }
}

impl UserRow {
    /// Rebuild the domain aggregate, describing the first invalid column.
    pub(crate) fn into_domain(self) -> Result<User, String> {
        let display_name = DisplayName::new(self.display_name)
            .map_err(|err| format!("user {}: display_name: {err}", self.id))?;
        let role: Role = self
            .role
            .parse()
            .map_err(|err| format!("user {}: role: {err}", self.id))?;
        let registration_code = RegistrationCode::parse(&self.registration_code)
            .map_err(|err| format!("user {}: registration_code: {err}", self.id))?;
        Ok(User::new(
            UserId::from_uuid(self.id),
            display_name,
            role,
            registration_code,
            self.created_at,
        ))
    }
}
