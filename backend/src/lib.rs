//! Procurement marketplace backend library.
//!
//! The domain holds entities, validation and ports; `crud` holds the
//! generic resource contract every REST resource implements; inbound and
//! outbound adapters map the domain onto HTTP and PostgreSQL.

pub mod crud;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
