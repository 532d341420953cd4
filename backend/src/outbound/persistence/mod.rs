//! Diesel/PostgreSQL persistence adapter.

mod diesel_file_repository;
mod diesel_opportunity_repository;
mod diesel_organization_repository;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
pub mod schema;

pub use diesel_file_repository::DieselFileRepository;
pub use diesel_opportunity_repository::DieselOpportunityRepository;
pub use diesel_organization_repository::DieselOrganizationRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
