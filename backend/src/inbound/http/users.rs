//! Users resource.
//!
//! ```text
//! GET    /api/v1/users
//! POST   /api/v1/users
//! GET    /api/v1/users/{id}
//! PUT    /api/v1/users/{id}
//! DELETE /api/v1/users/{id}
//! ```
//!
//! Listing is filtered rather than gated: admins see everyone, other
//! signed-in users see only themselves, anonymous callers see nothing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::crud::{self, CrudResource, ReadOneError};
use crate::domain::ports::{Deactivation, RepositoryError, UserRepository, UserUpdate};
use crate::domain::user::{
    CreateUserErrors, DeleteUserErrors, UpdateUserErrors, User, UserBody, UserFieldErrors,
    ValidatedUserBody, validate_job_title, validate_name, validate_unused_email,
    validate_user_id, validate_user_type,
};
use crate::domain::validation::{Validation, invalid, valid};
use crate::domain::validators::validate_uuid;
use crate::domain::{Session, permissions};

/// Update payload pinned to the resolved target id.
#[derive(Debug, Clone)]
pub struct ValidatedUserUpdate {
    pub id: Uuid,
    pub fields: ValidatedUserBody,
}

/// The users CRUD resource.
pub struct Users {
    users: Arc<dyn UserRepository>,
}

impl Users {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    async fn validate_fields(
        &self,
        session: &Session,
        body: &UserBody,
        target: Option<&User>,
    ) -> Validation<ValidatedUserBody, UserFieldErrors> {
        let user_type = validate_user_type(&body.user_type).and_then(|submitted| {
            // Only admins may move a user between roles.
            match target {
                Some(current)
                    if submitted != current.user_type && !permissions::is_admin(session) =>
                {
                    invalid(vec![
                        "Only administrators may change a user's type.".to_owned(),
                    ])
                }
                _ => valid(submitted),
            }
        });
        let name = validate_name(&body.name);
        let email =
            validate_unused_email(self.users.as_ref(), &body.email, target.map(|user| user.id))
                .await;
        let job_title = validate_job_title(&body.job_title);

        match (user_type, name, email, job_title) {
            (
                Validation::Valid(user_type),
                Validation::Valid(name),
                Validation::Valid(email),
                Validation::Valid(job_title),
            ) => valid(ValidatedUserBody {
                user_type,
                name,
                email,
                job_title,
            }),
            (user_type, name, email, job_title) => invalid(UserFieldErrors {
                user_type: user_type.err(),
                name: name.err(),
                email: email.err(),
                job_title: job_title.err(),
            }),
        }
    }
}

fn parse_body(body: &Value) -> UserBody {
    UserBody {
        user_type: crud::get_string(body, "type"),
        name: crud::get_string(body, "name"),
        email: crud::get_string(body, "email"),
        job_title: crud::get_string(body, "jobTitle"),
    }
}

fn permission_messages() -> Vec<String> {
    vec![permissions::ERROR_MESSAGE.to_owned()]
}

#[async_trait]
impl CrudResource for Users {
    const NAMESPACE: &'static str = "users";

    type Summary = User;
    type Entity = User;
    type CreateBody = UserBody;
    type ValidatedCreateBody = ValidatedUserBody;
    type CreateErrors = CreateUserErrors;
    type UpdateBody = UserBody;
    type ValidatedUpdateBody = ValidatedUserUpdate;
    type UpdateErrors = UpdateUserErrors;
    type ValidatedDeleteBody = User;
    type DeleteErrors = DeleteUserErrors;

    async fn read_many(&self, session: &Session) -> Result<Vec<User>, RepositoryError> {
        self.users.read_many(session).await
    }

    async fn read_one(&self, session: &Session, id: &str) -> Result<User, ReadOneError> {
        let target = match validate_uuid(id) {
            Validation::Valid(target) => target,
            Validation::Invalid(messages) => return Err(ReadOneError::InvalidId(messages)),
        };
        if !permissions::read_one_user(session, target) {
            return Err(ReadOneError::Unauthorized);
        }
        match self.users.read_one(target).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(ReadOneError::NotFound(vec!["User not found.".to_owned()])),
            Err(error) => {
                tracing::error!(error = %error, "user lookup failed");
                Err(ReadOneError::Database)
            }
        }
    }

    fn parse_create_body(&self, body: &Value) -> UserBody {
        parse_body(body)
    }

    async fn validate_create(
        &self,
        session: &Session,
        body: UserBody,
    ) -> Validation<ValidatedUserBody, CreateUserErrors> {
        if !permissions::create_user(session) {
            return invalid(CreateUserErrors {
                permissions: Some(permission_messages()),
                ..Default::default()
            });
        }
        match self.validate_fields(session, &body, None).await {
            Validation::Valid(fields) => valid(fields),
            Validation::Invalid(fields) => invalid(CreateUserErrors {
                permissions: None,
                fields,
            }),
        }
    }

    async fn create(
        &self,
        _session: &Session,
        body: ValidatedUserBody,
    ) -> Result<User, RepositoryError> {
        self.users.create(body).await
    }

    fn parse_update_body(&self, body: &Value) -> UserBody {
        parse_body(body)
    }

    async fn validate_update(
        &self,
        session: &Session,
        id: &str,
        body: UserBody,
    ) -> Validation<ValidatedUserUpdate, UpdateUserErrors> {
        let authorized = match validate_uuid(id) {
            Validation::Valid(target) => permissions::update_user(session, target),
            Validation::Invalid(_) => permissions::is_admin(session),
        };
        if !authorized {
            return invalid(UpdateUserErrors {
                permissions: Some(permission_messages()),
                ..Default::default()
            });
        }

        let target = match validate_user_id(self.users.as_ref(), id).await {
            Validation::Valid(target) => target,
            Validation::Invalid(messages) => {
                return invalid(UpdateUserErrors {
                    id: Some(messages),
                    ..Default::default()
                });
            }
        };
        match self.validate_fields(session, &body, Some(&target)).await {
            Validation::Valid(fields) => valid(ValidatedUserUpdate {
                id: target.id,
                fields,
            }),
            Validation::Invalid(fields) => invalid(UpdateUserErrors {
                permissions: None,
                id: None,
                fields,
            }),
        }
    }

    async fn update(
        &self,
        _session: &Session,
        body: ValidatedUserUpdate,
    ) -> Result<User, RepositoryError> {
        self.users
            .update(UserUpdate {
                id: body.id,
                fields: Some(body.fields),
                deactivation: None,
            })
            .await
    }

    async fn validate_delete(
        &self,
        session: &Session,
        id: &str,
    ) -> Validation<User, DeleteUserErrors> {
        let authorized = match validate_uuid(id) {
            Validation::Valid(target) => permissions::delete_user(session, target),
            Validation::Invalid(_) => permissions::is_admin(session),
        };
        if !authorized {
            return invalid(DeleteUserErrors {
                permissions: Some(permission_messages()),
                not_found: None,
            });
        }
        match validate_user_id(self.users.as_ref(), id).await {
            Validation::Valid(user) => valid(user),
            Validation::Invalid(_) => invalid(DeleteUserErrors {
                permissions: None,
                not_found: Some(vec!["User not found.".to_owned()]),
            }),
        }
    }

    async fn delete(&self, session: &Session, user: User) -> Result<User, RepositoryError> {
        let actor = session
            .user_id()
            .ok_or_else(|| RepositoryError::query("delete without authenticated session"))?;
        self.users
            .update(UserUpdate {
                id: user.id,
                fields: None,
                deactivation: Some(Deactivation {
                    on: Utc::now(),
                    by: actor,
                }),
            })
            .await
    }
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
