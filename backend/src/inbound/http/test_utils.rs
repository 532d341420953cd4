//! Shared helpers for HTTP handler tests.

use actix_http::Request;
use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test as actix_test, web};

use crate::crud;
use crate::domain::ports::UserRepository;
use crate::domain::user::{User, UserType, ValidatedUserBody};
use crate::inbound::http::opportunities::Opportunities;
use crate::inbound::http::organizations::Organizations;
use crate::inbound::http::sessions::{
    LoginRequest, create_session, delete_current_session, read_current_session,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::Users;

/// Shared password accepted by the in-memory login service in tests.
pub const TEST_PASSWORD: &str = "password";

/// Session middleware with a fixed key and lax cookie settings for tests.
///
/// The default cookie name (`id`) is kept so tests can fish the cookie out
/// of responses by that name.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::from(&[7; 64]))
        .cookie_secure(false)
        .build()
}

/// An app exposing the whole `/api/v1` surface over the given state.
pub fn api_test_app(
    state: HttpState,
    reward_max: i64,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let sessions = state.session_resolver();
    App::new()
        .wrap(test_session_middleware())
        .service(
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
                .service(crud::scope(Users::new(state.users.clone()), sessions)),
        )
}

/// Register a user directly against the state's user store.
pub async fn seed_user(state: &HttpState, user_type: UserType, name: &str, email: &str) -> User {
    state
        .users
        .create(ValidatedUserBody {
            user_type,
            name: name.to_owned(),
            email: email.to_owned(),
            job_title: None,
        })
        .await
        .expect("seed user")
}

/// Log in through the sessions endpoint and return the session cookie.
pub async fn login_cookie(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
) -> Cookie<'static> {
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/sessions")
            .set_json(LoginRequest {
                email: email.to_owned(),
                password: TEST_PASSWORD.to_owned(),
            })
            .to_request(),
    )
    .await;
    assert!(
        response.status().is_success(),
        "login failed for {email}: {}",
        response.status()
    );
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "id")
        .expect("session cookie")
        .into_owned()
}
