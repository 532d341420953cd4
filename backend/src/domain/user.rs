//! User data model and field validation.
//!
//! Users come in three flavours mirroring the identity providers of the
//! marketplace: administrators, public-sector (government) staff who post
//! opportunities, and vendors who respond to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ports::{RepositoryError, UserRepository};
use super::validation::{Validation, invalid, valid};
use super::validators::{
    validate_email, validate_generic_string, validate_optional_string, validate_uuid,
};

/// Maximum length of a user's display name.
pub const NAME_MAX: usize = 100;
/// Maximum length of a user's job title.
pub const JOB_TITLE_MAX: usize = 150;

/// Role of a user, deciding what they may create and see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserType {
    /// Marketplace administrator.
    Admin,
    /// Public-sector user who posts opportunities.
    Gov,
    /// Vendor responding to opportunities.
    Vendor,
}

/// A registered marketplace user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// `true` for administrators.
    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }

    /// `true` for public-sector users.
    pub fn is_gov(&self) -> bool {
        self.user_type == UserType::Gov
    }
}

/// Raw user payload lifted tolerantly from a request body.
#[derive(Debug, Default, Clone)]
pub struct UserBody {
    pub user_type: String,
    pub name: String,
    pub email: String,
    pub job_title: String,
}

/// Entity-shaped user payload produced once every field validates.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedUserBody {
    pub user_type: UserType,
    pub name: String,
    pub email: String,
    pub job_title: Option<String>,
}

/// Field-level error map for user payloads.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFieldErrors {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub user_type: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<Vec<String>>,
}

/// Error body for `POST /users`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(flatten)]
    pub fields: UserFieldErrors,
}

/// Error body for `PUT /users/{id}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<String>>,
    #[serde(flatten)]
    pub fields: UserFieldErrors,
}

/// Error body for `DELETE /users/{id}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_found: Option<Vec<String>>,
}

/// Validate the `type` discriminator of a user payload.
pub fn validate_user_type(raw: &str) -> Validation<UserType> {
    match raw.trim() {
        "ADMIN" => valid(UserType::Admin),
        "GOV" => valid(UserType::Gov),
        "VENDOR" => valid(UserType::Vendor),
        _ => invalid(vec!["Type must be one of ADMIN, GOV or VENDOR.".to_owned()]),
    }
}

/// Validate a user's display name.
pub fn validate_name(raw: &str) -> Validation<String> {
    validate_generic_string(raw, "Name", 1, NAME_MAX)
}

/// Validate a user's optional job title.
pub fn validate_job_title(raw: &str) -> Validation<Option<String>> {
    validate_optional_string(raw, "Job title", JOB_TITLE_MAX)
}

/// Validate an email address and check it is not already registered.
///
/// `exclude` skips the uniqueness check for the named user, so updates can
/// resubmit an unchanged address.
pub async fn validate_unused_email(
    users: &dyn UserRepository,
    raw: &str,
    exclude: Option<Uuid>,
) -> Validation<String> {
    let email = match validate_email(raw) {
        Validation::Valid(email) => email,
        Validation::Invalid(errors) => return invalid(errors),
    };
    match users.find_by_email(&email).await {
        Ok(Some(existing)) if Some(existing.id) != exclude => {
            invalid(vec!["This email address is already in use.".to_owned()])
        }
        Ok(_) => valid(email),
        Err(error) => {
            tracing::warn!(error = %error, "email uniqueness check failed");
            invalid(vec![
                "Unable to verify the email address. Please try again later.".to_owned(),
            ])
        }
    }
}

/// Resolve a raw user id to its stored record.
pub async fn validate_user_id(users: &dyn UserRepository, raw: &str) -> Validation<User> {
    let id = match validate_uuid(raw) {
        Validation::Valid(id) => id,
        Validation::Invalid(errors) => return invalid(errors),
    };
    match users.read_one(id).await {
        Ok(Some(user)) => valid(user),
        Ok(None) => invalid(vec!["User not found.".to_owned()]),
        Err(RepositoryError::Connection { .. } | RepositoryError::Query { .. }) => invalid(vec![
            "Unable to verify the specified user. Please try again later.".to_owned(),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ADMIN", Some(UserType::Admin))]
    #[case("GOV", Some(UserType::Gov))]
    #[case("VENDOR", Some(UserType::Vendor))]
    #[case("vendor", None)]
    #[case("", None)]
    fn user_type_parses_known_discriminators(
        #[case] raw: &str,
        #[case] expected: Option<UserType>,
    ) {
        assert_eq!(validate_user_type(raw).ok(), expected);
    }

    #[rstest]
    fn user_serialises_type_key_and_camel_case() {
        let user = User {
            id: Uuid::nil(),
            user_type: UserType::Gov,
            name: "Casey Procurement".to_owned(),
            email: "casey@example.gov".to_owned(),
            job_title: Some("Buyer".to_owned()),
            active: true,
            deactivated_on: None,
            deactivated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).expect("serialise user");
        assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("GOV"));
        assert_eq!(value.get("jobTitle").and_then(|v| v.as_str()), Some("Buyer"));
        assert!(value.get("deactivatedOn").is_none());
    }
}
