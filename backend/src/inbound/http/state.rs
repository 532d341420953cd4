//! Shared HTTP adapter state.
//!
//! Handlers depend on domain ports only, bundled here behind `Arc` so the
//! same state serves database-backed and in-memory assemblies alike.

use std::sync::Arc;

use crate::domain::ports::{
    DevLoginService, FileRepository, InMemoryFileRepository, InMemoryOpportunityRepository,
    InMemoryOrganizationRepository, InMemoryUserRepository, LoginService, OpportunityRepository,
    OrganizationRepository, UserRepository,
};
use crate::inbound::http::session::SessionResolver;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub opportunities: Arc<dyn OpportunityRepository>,
    pub files: Arc<dyn FileRepository>,
    pub login: Arc<dyn LoginService>,
}

impl HttpState {
    /// Bundle explicit port implementations.
    pub fn new(
        users: Arc<dyn UserRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        opportunities: Arc<dyn OpportunityRepository>,
        files: Arc<dyn FileRepository>,
        login: Arc<dyn LoginService>,
    ) -> Self {
        Self {
            users,
            organizations,
            opportunities,
            files,
            login,
        }
    }

    /// Fully in-memory state for tests and the database-less dev server.
    pub fn in_memory(dev_password: &str) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let login: Arc<dyn LoginService> =
            Arc::new(DevLoginService::new(users.clone(), dev_password));
        Self {
            users,
            organizations: Arc::new(InMemoryOrganizationRepository::new()),
            opportunities: Arc::new(InMemoryOpportunityRepository::new()),
            files: Arc::new(InMemoryFileRepository::new()),
            login,
        }
    }

    /// Session resolver over this state's user store.
    pub fn session_resolver(&self) -> SessionResolver {
        SessionResolver::new(self.users.clone())
    }
}
