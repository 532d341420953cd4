//! HTTP error type for handlers outside the generic CRUD lifecycle.
//!
//! The CRUD handlers build their responses directly; session and auth
//! handlers return [`ApiError`] and let Actix render it. Bodies use the
//! same field→messages map shape as the CRUD surface, and statuses stay
//! inside the fixed set {400, 401, 404, 503}.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::{Value, json};
use thiserror::Error;

use crate::domain::{permissions, ports};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error responses for the non-CRUD HTTP surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Malformed input; carries the field→messages map to return.
    #[error("request validation failed")]
    Validation(Value),
    /// Missing or insufficient authentication.
    #[error("not authorized")]
    Unauthorized,
    /// The requested record does not exist.
    #[error("not found")]
    NotFound(String),
    /// A backing service could not be reached; never carries the cause.
    #[error("service unavailable")]
    ServiceUnavailable,
}

impl ApiError {
    fn body(&self) -> Value {
        match self {
            Self::Validation(errors) => errors.clone(),
            Self::Unauthorized => json!({ "permissions": [permissions::ERROR_MESSAGE] }),
            Self::NotFound(message) => json!({ "notFound": [message] }),
            Self::ServiceUnavailable => json!({ "database": [ports::ERROR_MESSAGE] }),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ApiError::Unauthorized, StatusCode::UNAUTHORIZED, "permissions")]
    #[case(ApiError::NotFound("Session not found.".to_owned()), StatusCode::NOT_FOUND, "notFound")]
    #[case(ApiError::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE, "database")]
    fn statuses_and_keys_stay_in_the_fixed_set(
        #[case] error: ApiError,
        #[case] status: StatusCode,
        #[case] key: &str,
    ) {
        assert_eq!(error.status_code(), status);
        let body = error.body();
        let messages = body.get(key).and_then(Value::as_array).expect("message key");
        assert!(!messages.is_empty());
    }

    #[rstest]
    fn validation_errors_pass_their_map_through() {
        let error = ApiError::Validation(json!({ "email": ["Please enter a valid email."] }));
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert!(error.body().get("email").is_some());
    }
}
