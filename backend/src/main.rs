//! Backend entry-point: configuration, stores, and the HTTP server.

mod server;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::domain::ports::{DevLoginService, LoginService, UserRepository};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{
    DbPool, DieselFileRepository, DieselOpportunityRepository, DieselOrganizationRepository,
    DieselUserRepository, PoolConfig,
};
use server::AppConfig;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let config = AppConfig::from_env();

    let state = match &config.database_url {
        Some(url) => {
            let pool = DbPool::new(PoolConfig::new(url.as_str()))
                .await
                .map_err(std::io::Error::other)?;
            let users: Arc<dyn UserRepository> =
                Arc::new(DieselUserRepository::new(pool.clone()));
            let login: Arc<dyn LoginService> = Arc::new(DevLoginService::new(
                users.clone(),
                config.dev_login_password.clone(),
            ));
            info!("using PostgreSQL-backed stores");
            HttpState::new(
                users,
                Arc::new(DieselOrganizationRepository::new(pool.clone())),
                Arc::new(DieselOpportunityRepository::new(pool.clone())),
                Arc::new(DieselFileRepository::new(pool)),
                login,
            )
        }
        None => {
            warn!("DATABASE_URL not set; falling back to in-memory stores");
            let state = HttpState::in_memory(&config.dev_login_password);
            server::seed_dev_users(&state).await;
            state
        }
    };

    info!(addr = %config.bind_addr, "starting server");
    server::run(&config, state)?.await
}
