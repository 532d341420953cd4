//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: the sessions adapter calls
//! it to authenticate credentials without knowing the backing identity
//! provider. The production marketplace delegates to an external IdP; this
//! port is the seam such an adapter would fill.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::UserRepository;
use crate::domain::user::User;

/// Failures surfaced while authenticating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    /// Unknown email, wrong password, or deactivated account.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The backing store could not be consulted.
    #[error("login unavailable: {message}")]
    Unavailable { message: String },
}

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    async fn authenticate(&self, email: &str, password: &str) -> Result<User, LoginError>;
}

/// Development authenticator: a single shared password over the user store.
///
/// Stands in until an identity-provider adapter is wired; any active user
/// authenticates with the configured development password.
pub struct DevLoginService {
    users: Arc<dyn UserRepository>,
    password: String,
}

impl DevLoginService {
    pub fn new(users: Arc<dyn UserRepository>, password: impl Into<String>) -> Self {
        Self {
            users,
            password: password.into(),
        }
    }
}

#[async_trait]
impl LoginService for DevLoginService {
    async fn authenticate(&self, email: &str, password: &str) -> Result<User, LoginError> {
        if password != self.password {
            return Err(LoginError::InvalidCredentials);
        }
        let found = self
            .users
            .find_by_email(email)
            .await
            .map_err(|error| LoginError::Unavailable {
                message: error.to_string(),
            })?;
        match found {
            Some(user) if user.active => Ok(user),
            _ => Err(LoginError::InvalidCredentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::InMemoryUserRepository;
    use crate::domain::user::{UserType, ValidatedUserBody};
    use rstest::rstest;

    async fn service_with_user() -> (DevLoginService, User) {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = users
            .create(ValidatedUserBody {
                user_type: UserType::Vendor,
                name: "Pat Vendor".to_owned(),
                email: "pat@example.com".to_owned(),
                job_title: None,
            })
            .await
            .expect("create user");
        (DevLoginService::new(users, "password"), user)
    }

    #[rstest]
    #[case("pat@example.com", "password", true)]
    #[case("pat@example.com", "wrong", false)]
    #[case("unknown@example.com", "password", false)]
    #[tokio::test]
    async fn authenticates_known_active_users(
        #[case] email: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let (service, user) = service_with_user().await;
        match (should_succeed, service.authenticate(email, password).await) {
            (true, Ok(authenticated)) => assert_eq!(authenticated.id, user.id),
            (false, Err(LoginError::InvalidCredentials)) => {}
            (expected, outcome) => {
                panic!("expected success={expected}, got {outcome:?}")
            }
        }
    }
}
