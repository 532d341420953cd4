//! Session helpers keeping HTTP handlers free of framework-specific logic.
//!
//! [`SessionContext`] wraps the Actix cookie session; [`SessionResolver`]
//! hydrates the domain [`Session`] from it, one per request. Tampered or
//! stale cookies degrade to an anonymous session rather than an error.

use std::sync::Arc;

use actix_session::Session as CookieSession;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::domain::Session;
use crate::domain::ports::UserRepository;
use crate::inbound::http::error::ApiError;

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper exposing higher-level session-cookie operations.
#[derive(Clone)]
pub struct SessionContext(CookieSession);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: CookieSession) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    pub fn persist_user(&self, user_id: Uuid) -> Result<(), ApiError> {
        self.0.insert(USER_ID_KEY, user_id).map_err(|error| {
            tracing::error!(error = %error, "failed to persist session");
            ApiError::ServiceUnavailable
        })
    }

    /// The user id from the session cookie, if present and well-formed.
    pub fn user_id(&self) -> Option<Uuid> {
        match self.0.get::<Uuid>(USER_ID_KEY) {
            Ok(id) => id,
            Err(error) => {
                tracing::warn!(error = %error, "invalid user id in session cookie");
                None
            }
        }
    }

    /// Drop everything from the session, ending it.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = CookieSession::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// Hydrates the domain session from the cookie, one lookup per request.
#[derive(Clone)]
pub struct SessionResolver {
    users: Arc<dyn UserRepository>,
}

impl SessionResolver {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Resolve the request's session. A cookie naming an unknown or
    /// deactivated user, or a store failure, resolves to anonymous.
    pub async fn resolve(&self, ctx: &SessionContext) -> Session {
        let Some(id) = ctx.user_id() else {
            return Session::anonymous();
        };
        match self.users.read_one(id).await {
            Ok(Some(user)) if user.active => Session::authenticated(user),
            Ok(_) => Session::anonymous(),
            Err(error) => {
                tracing::warn!(error = %error, "session user lookup failed");
                Session::anonymous()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    #[actix_web::test]
    async fn round_trips_user_id() {
        let user_id = Uuid::new_v4();
        let app = test::init_service(
            App::new()
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/set",
                    web::get().to(move |session: SessionContext| async move {
                        session.persist_user(user_id)?;
                        Ok::<_, ApiError>(HttpResponse::Ok().finish())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        match session.user_id() {
                            Some(id) => HttpResponse::Ok().body(id.to_string()),
                            None => HttpResponse::Unauthorized().finish(),
                        }
                    }),
                ),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = set_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "id")
            .expect("session cookie set")
            .into_owned();

        let get_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/get")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = test::read_body(get_res).await;
        assert_eq!(body, user_id.to_string().as_bytes());
    }

    #[actix_web::test]
    async fn missing_cookie_resolves_anonymous() {
        let users: Arc<dyn UserRepository> =
            Arc::new(crate::domain::ports::InMemoryUserRepository::new());
        let resolver = SessionResolver::new(users);
        let app = test::init_service(
            App::new()
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/whoami",
                    web::get().to(move |ctx: SessionContext| {
                        let resolver = resolver.clone();
                        async move {
                            let session = resolver.resolve(&ctx).await;
                            HttpResponse::Ok().json(session.user.is_some())
                        }
                    }),
                ),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        let body: bool = test::read_body_json(res).await;
        assert!(!body);
    }
}
