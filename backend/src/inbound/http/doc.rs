//! OpenAPI documentation for the REST API.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, Role};
use crate::inbound::http::registrations::{
    ReassignedCodeResponse, ReconciliationResponse, RegisterUserBody, RegisteredUserResponse,
};

/// OpenAPI document covering registration and health endpoints.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Registrar API",
        description = "Registration-number allocation for school accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::registrations::register_user,
        crate::inbound::http::registrations::reconcile_registrations,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        RegisterUserBody,
        RegisteredUserResponse,
        ReassignedCodeResponse,
        ReconciliationResponse,
    )),
    tags(
        (name = "registrations", description = "User registration and code reconciliation"),
        (name = "health", description = "Orchestration health checks")
    )
)]
pub struct ApiDoc;
