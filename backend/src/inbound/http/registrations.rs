//! Registration API handlers.
//!
//! ```text
//! POST /api/v1/registrations {"displayName":"Ada Lovelace","role":"student"}
//! POST /api/v1/registrations/reconcile
//! ```

use actix_web::{HttpResponse, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{ReconciliationReport, RegisterUserRequest, ReissuedCode};
use crate::domain::{Error, Role, User, UserValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/registrations`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserBody {
    /// 3 to 32 characters of letters, digits, spaces or underscores.
    #[schema(example = "Ada Lovelace")]
    pub display_name: String,
    /// `student`, `teacher`, `parent` or `admin`.
    #[schema(example = "student")]
    pub role: String,
}

impl TryFrom<RegisterUserBody> for RegisterUserRequest {
    type Error = UserValidationError;

    fn try_from(body: RegisterUserBody) -> Result<Self, Self::Error> {
        Ok(Self {
            display_name: body.display_name,
            role: body.role.parse()?,
        })
    }
}

/// Newly registered user.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUserResponse {
    /// Account identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    /// Display name as stored.
    pub display_name: String,
    /// Account role.
    pub role: Role,
    /// Issued code; `ERR-<millis>` while numbering is degraded.
    #[schema(example = "42AB")]
    pub registration_code: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<User> for RegisteredUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().to_string(),
            display_name: user.display_name().to_string(),
            role: user.role(),
            registration_code: user.registration_code().to_string(),
            created_at: user.created_at(),
        }
    }
}

/// A fallback code replaced during reconciliation.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReassignedCodeResponse {
    /// Account identifier.
    pub user_id: String,
    /// Fallback code that was replaced.
    #[schema(example = "ERR-1788000000123")]
    pub previous_code: String,
    /// Newly issued code.
    #[schema(example = "7B")]
    pub registration_code: String,
}

impl From<ReissuedCode> for ReassignedCodeResponse {
    fn from(entry: ReissuedCode) -> Self {
        Self {
            user_id: entry.user_id.to_string(),
            previous_code: entry.previous.to_string(),
            registration_code: entry.replacement.to_string(),
        }
    }
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResponse {
    /// Codes replaced during the pass.
    pub reassigned: Vec<ReassignedCodeResponse>,
    /// Fallback holders left for a later pass.
    pub pending: usize,
}

impl From<ReconciliationReport> for ReconciliationResponse {
    fn from(report: ReconciliationReport) -> Self {
        Self {
            reassigned: report.reissued.into_iter().map(Into::into).collect(),
            pending: report.pending,
        }
    }
}

fn map_body_error(err: UserValidationError) -> Error {
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": "role", "code": "unknown_role" }))
}

/// Register a user and issue their registration code.
///
/// A degraded store still yields `201`; the code is then a fallback.
#[utoipa::path(
    post,
    path = "/api/v1/registrations",
    request_body = RegisterUserBody,
    responses(
        (status = 201, description = "User registered", body = RegisteredUserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "User store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "registerUser"
)]
#[post("/registrations")]
pub async fn register_user(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterUserBody>,
) -> ApiResult<HttpResponse> {
    let request = RegisterUserRequest::try_from(payload.into_inner()).map_err(map_body_error)?;
    let user = state.registrations.register(request).await?;
    Ok(HttpResponse::Created().json(RegisteredUserResponse::from(user)))
}

/// Reissue well-formed codes to users holding fallback codes.
#[utoipa::path(
    post,
    path = "/api/v1/registrations/reconcile",
    responses(
        (status = 200, description = "Reconciliation pass finished", body = ReconciliationResponse),
        (status = 503, description = "User store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["registrations"],
    operation_id = "reconcileRegistrations"
)]
#[post("/registrations/reconcile")]
pub async fn reconcile_registrations(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<ReconciliationResponse>> {
    let report = state.reconciliation.reconcile().await?;
    Ok(web::Json(report.into()))
}
