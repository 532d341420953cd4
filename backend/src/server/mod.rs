//! Server construction and middleware wiring.

mod config;

pub use config::{AppConfig, DEFAULT_CWU_MAX_BUDGET, parse_boolean_environment_variable};

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::Server;
use actix_web::{App, HttpServer, Scope, web};
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use backend::crud;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::ports::UserRepository;
use backend::domain::user::{UserType, ValidatedUserBody};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::opportunities::Opportunities;
use backend::inbound::http::organizations::Organizations;
use backend::inbound::http::sessions::{
    create_session, delete_current_session, read_current_session,
};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::Users;

/// Build the `/api/v1` scope: session endpoints plus the CRUD resources.
pub fn build_api_scope(state: &HttpState, reward_max: i64) -> Scope {
    let sessions = state.session_resolver();
    web::scope("/api/v1")
        .app_data(web::Data::new(state.clone()))
        .service(create_session)
        .service(read_current_session)
        .service(delete_current_session)
        .service(crud::scope(
            Organizations::new(state.organizations.clone(), state.files.clone()),
            sessions.clone(),
        ))
        .service(crud::scope(
            Opportunities::new(state.opportunities.clone(), reward_max),
            sessions.clone(),
        ))
        .service(crud::scope(Users::new(state.users.clone()), sessions))
}

/// Load the session signing key, generating an ephemeral one where the
/// configuration allows it.
pub fn load_session_key(config: &AppConfig) -> std::io::Result<Key> {
    match std::fs::read(&config.session_key_file) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(error) => {
            if cfg!(debug_assertions) || config.session_allow_ephemeral {
                warn!(
                    path = %config.session_key_file,
                    error = %error,
                    "using temporary session key (dev only)"
                );
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {}: {error}",
                    config.session_key_file
                )))
            }
        }
    }
}

/// Seed the in-memory stores with one user per role so a fresh dev server
/// is immediately usable.
pub async fn seed_dev_users(state: &HttpState) {
    let seeds = [
        (UserType::Admin, "Avery Admin", "admin@example.com"),
        (UserType::Gov, "Casey Procurement", "buyer@example.gov"),
        (UserType::Vendor, "Pat Vendor", "vendor@example.com"),
    ];
    for (user_type, name, email) in seeds {
        let created = state
            .users
            .create(ValidatedUserBody {
                user_type,
                name: name.to_owned(),
                email: email.to_owned(),
                job_title: None,
            })
            .await;
        match created {
            Ok(user) => info!(email = %user.email, "seeded dev user"),
            Err(error) => warn!(error = %error, "failed to seed dev user"),
        }
    }
}

/// Bind and start the HTTP server.
pub fn run(config: &AppConfig, state: HttpState) -> std::io::Result<Server> {
    let key = load_session_key(config)?;
    let health = web::Data::new(HealthState::new());
    let factory_health = health.clone();
    let cookie_secure = config.cookie_secure;
    let reward_max = config.cwu_max_budget;

    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".to_owned())
            .cookie_path("/".to_owned())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(SameSite::Lax)
            .build();

        let api = build_api_scope(&state, reward_max).wrap(session);

        let app = App::new()
            .app_data(factory_health.clone())
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(config.bind_addr)?;

    health.mark_ready();
    Ok(server.run())
}
