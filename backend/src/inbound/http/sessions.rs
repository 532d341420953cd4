//! Session (authentication) endpoints.
//!
//! ```text
//! POST   /api/v1/sessions          {"email":"...","password":"..."}
//! GET    /api/v1/sessions/current
//! DELETE /api/v1/sessions/current
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::Session;
use crate::domain::ports::LoginError;
use crate::inbound::http::error::{ApiError, ApiResult};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/sessions`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authenticate and establish a cookie session.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Session established", body = Session),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Invalid credentials"),
        (status = 503, description = "Service unavailable")
    ),
    tags = ["sessions"],
    operation_id = "createSession",
    security([])
)]
#[post("/sessions")]
pub async fn create_session(
    state: web::Data<HttpState>,
    ctx: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { email, password } = payload.into_inner();

    let mut errors = serde_json::Map::new();
    if email.trim().is_empty() {
        errors.insert("email".to_owned(), json!(["Email is required."]));
    }
    if password.is_empty() {
        errors.insert("password".to_owned(), json!(["Password is required."]));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(Value::Object(errors)));
    }

    let user = state
        .login
        .authenticate(email.trim(), &password)
        .await
        .map_err(|error| match error {
            LoginError::InvalidCredentials => ApiError::Unauthorized,
            LoginError::Unavailable { message } => {
                tracing::error!(error = %message, "login backend unavailable");
                ApiError::ServiceUnavailable
            }
        })?;

    ctx.persist_user(user.id)?;
    Ok(HttpResponse::Created().json(Session::authenticated(user)))
}

/// Return the current session; the user is null for anonymous callers.
#[utoipa::path(
    get,
    path = "/api/v1/sessions/current",
    responses((status = 200, description = "Current session", body = Session)),
    tags = ["sessions"],
    operation_id = "readCurrentSession",
    security([])
)]
#[get("/sessions/current")]
pub async fn read_current_session(
    state: web::Data<HttpState>,
    ctx: SessionContext,
) -> HttpResponse {
    let session = state.session_resolver().resolve(&ctx).await;
    HttpResponse::Ok().json(session)
}

/// End the current session.
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/current",
    responses((status = 200, description = "Session ended", body = Session)),
    tags = ["sessions"],
    operation_id = "deleteCurrentSession",
    security([])
)]
#[delete("/sessions/current")]
pub async fn delete_current_session(ctx: SessionContext) -> HttpResponse {
    ctx.clear();
    HttpResponse::Ok().json(Session::anonymous())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UserRepository;
    use crate::domain::user::{UserType, ValidatedUserBody};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    async fn state_with_user() -> HttpState {
        let state = HttpState::in_memory("password");
        state
            .users
            .create(ValidatedUserBody {
                user_type: UserType::Vendor,
                name: "Pat Vendor".to_owned(),
                email: "pat@example.com".to_owned(),
                job_title: None,
            })
            .await
            .expect("seed user");
        state
    }

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .service(create_session)
                    .service(read_current_session)
                    .service(delete_current_session),
            )
    }

    #[rstest]
    #[case("pat@example.com", "wrong", StatusCode::UNAUTHORIZED)]
    #[case("nobody@example.com", "password", StatusCode::UNAUTHORIZED)]
    #[case("", "password", StatusCode::BAD_REQUEST)]
    #[case("pat@example.com", "", StatusCode::BAD_REQUEST)]
    #[actix_web::test]
    async fn login_rejects_bad_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: StatusCode,
    ) {
        let app = actix_test::init_service(test_app(state_with_user().await)).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/sessions")
            .set_json(LoginRequest {
                email: email.to_owned(),
                password: password.to_owned(),
            })
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), expected);
    }

    #[actix_web::test]
    async fn login_round_trips_through_current_session() {
        let app = actix_test::init_service(test_app(state_with_user().await)).await;

        let login_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/sessions")
                .set_json(LoginRequest {
                    email: "pat@example.com".to_owned(),
                    password: "password".to_owned(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::CREATED);
        let cookie = login_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "id")
            .expect("session cookie")
            .into_owned();

        let current_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/sessions/current")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let current: Value = actix_test::read_body_json(current_res).await;
        assert_eq!(
            current
                .get("user")
                .and_then(|user| user.get("email"))
                .and_then(Value::as_str),
            Some("pat@example.com")
        );

        let logout_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri("/api/v1/sessions/current")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let emptied: Value = actix_test::read_body_json(logout_res).await;
        assert!(emptied.get("user").is_some_and(Value::is_null));
    }

    #[actix_web::test]
    async fn anonymous_current_session_has_null_user() {
        let app = actix_test::init_service(test_app(state_with_user().await)).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/sessions/current")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert!(body.get("user").is_some_and(Value::is_null));
    }
}
