//! Registration number service.
//!
//! `domain` holds the code encoding and use-cases, `outbound` the storage
//! adapters and `inbound` the HTTP surface.

pub mod domain;
pub mod inbound;
pub mod outbound;

/// Public OpenAPI surface used by tooling.
pub use inbound::http::doc::ApiDoc;
