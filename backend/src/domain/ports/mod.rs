//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the relational store, the identity provider). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants; the HTTP layer reduces every variant to the same opaque 503
//! body, never the underlying cause.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

mod file_repository;
mod login_service;
mod opportunity_repository;
mod organization_repository;
mod user_repository;

pub use file_repository::{FileRepository, InMemoryFileRepository};
pub use login_service::{DevLoginService, LoginError, LoginService};
pub use opportunity_repository::{
    InMemoryOpportunityRepository, NewAddendum, OpportunityRepository, OpportunityUpdate,
};
pub use organization_repository::{
    InMemoryOrganizationRepository, OrganizationRepository, OrganizationUpdate,
};
pub use user_repository::{InMemoryUserRepository, UserRepository, UserUpdate};

/// Fixed message surfaced under the `database` error key.
pub const ERROR_MESSAGE: &str = "A database error occurred. Please try again later.";

/// Errors surfaced by persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Connectivity, pool checkout or transaction failures.
    #[error("repository connection failed: {message}")]
    Connection { message: String },
    /// Query construction or execution failures.
    #[error("repository query failed: {message}")]
    Query { message: String },
}

impl RepositoryError {
    /// Helper for connection-level adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query-level adapter errors.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Audit stamp applied when soft-deactivating an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deactivation {
    /// When the entity was deactivated.
    pub on: DateTime<Utc>,
    /// The acting user.
    pub by: Uuid,
}
