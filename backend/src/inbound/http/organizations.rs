//! Organizations resource.
//!
//! ```text
//! GET    /api/v1/organizations
//! POST   /api/v1/organizations
//! GET    /api/v1/organizations/{id}
//! PUT    /api/v1/organizations/{id}
//! DELETE /api/v1/organizations/{id}
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::crud::{self, CrudResource, ReadOneError};
use crate::domain::organization::{
    CreateOrganizationErrors, DeleteOrganizationErrors, Organization, OrganizationBody,
    OrganizationFieldErrors, OrganizationSlim, UpdateOrganizationErrors,
    ValidatedOrganizationBody, validate_organization_body, validate_organization_id,
};
use crate::domain::ports::{
    Deactivation, FileRepository, OrganizationRepository, OrganizationUpdate, RepositoryError,
};
use crate::domain::validation::{Validation, invalid, valid};
use crate::domain::validators::validate_uuid;
use crate::domain::{Session, User, permissions};

/// Create payload plus the owner taken from the authorized session.
#[derive(Debug, Clone)]
pub struct ValidatedOrganizationCreate {
    pub owner: User,
    pub fields: ValidatedOrganizationBody,
}

/// Update payload pinned to the resolved target id.
#[derive(Debug, Clone)]
pub struct ValidatedOrganizationUpdate {
    pub id: Uuid,
    pub fields: ValidatedOrganizationBody,
}

/// The organizations CRUD resource.
pub struct Organizations {
    organizations: Arc<dyn OrganizationRepository>,
    files: Arc<dyn FileRepository>,
}

impl Organizations {
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        files: Arc<dyn FileRepository>,
    ) -> Self {
        Self {
            organizations,
            files,
        }
    }
}

fn parse_body(body: &Value) -> OrganizationBody {
    OrganizationBody {
        legal_name: crud::get_string(body, "legalName"),
        logo_image_file: crud::get_optional_string(body, "logoImageFile"),
        website_url: crud::get_string(body, "websiteUrl"),
        street_address1: crud::get_string(body, "streetAddress1"),
        street_address2: crud::get_string(body, "streetAddress2"),
        city: crud::get_string(body, "city"),
        region: crud::get_string(body, "region"),
        mail_code: crud::get_string(body, "mailCode"),
        country: crud::get_string(body, "country"),
        contact_name: crud::get_string(body, "contactName"),
        contact_title: crud::get_string(body, "contactTitle"),
        contact_email: crud::get_string(body, "contactEmail"),
        contact_phone: crud::get_string(body, "contactPhone"),
    }
}

fn permission_messages() -> Vec<String> {
    vec![permissions::ERROR_MESSAGE.to_owned()]
}

#[async_trait]
impl CrudResource for Organizations {
    const NAMESPACE: &'static str = "organizations";

    type Summary = OrganizationSlim;
    type Entity = Organization;
    type CreateBody = OrganizationBody;
    type ValidatedCreateBody = ValidatedOrganizationCreate;
    type CreateErrors = CreateOrganizationErrors;
    type UpdateBody = OrganizationBody;
    type ValidatedUpdateBody = ValidatedOrganizationUpdate;
    type UpdateErrors = UpdateOrganizationErrors;
    type ValidatedDeleteBody = Organization;
    type DeleteErrors = DeleteOrganizationErrors;

    async fn read_many(
        &self,
        session: &Session,
    ) -> Result<Vec<OrganizationSlim>, RepositoryError> {
        // Session goes along so owner details appear for admins and owners
        // only.
        self.organizations.read_many(session).await
    }

    async fn read_one(&self, session: &Session, id: &str) -> Result<Organization, ReadOneError> {
        let target = match validate_uuid(id) {
            Validation::Valid(target) => target,
            Validation::Invalid(messages) => return Err(ReadOneError::InvalidId(messages)),
        };
        // Only admins or the organization owner see the full record.
        if !permissions::read_one_organization(self.organizations.as_ref(), session, target).await
        {
            return Err(ReadOneError::Unauthorized);
        }
        match self.organizations.read_one(target).await {
            Ok(Some(organization)) => Ok(organization),
            Ok(None) => Err(ReadOneError::NotFound(vec![
                "Organization not found.".to_owned(),
            ])),
            Err(error) => {
                tracing::error!(error = %error, "organization lookup failed");
                Err(ReadOneError::Database)
            }
        }
    }

    fn parse_create_body(&self, body: &Value) -> OrganizationBody {
        parse_body(body)
    }

    async fn validate_create(
        &self,
        session: &Session,
        body: OrganizationBody,
    ) -> Validation<ValidatedOrganizationCreate, CreateOrganizationErrors> {
        // Permission precedes field validation on every mutating operation.
        let owner = match session.user.clone() {
            Some(owner) if permissions::create_organization(session) => owner,
            _ => {
                return invalid(CreateOrganizationErrors {
                    permissions: Some(permission_messages()),
                    ..Default::default()
                });
            }
        };
        match validate_organization_body(self.files.as_ref(), &body).await {
            Validation::Valid(fields) => valid(ValidatedOrganizationCreate { owner, fields }),
            Validation::Invalid(fields) => invalid(CreateOrganizationErrors {
                permissions: None,
                fields,
            }),
        }
    }

    async fn create(
        &self,
        _session: &Session,
        body: ValidatedOrganizationCreate,
    ) -> Result<Organization, RepositoryError> {
        self.organizations.create(&body.owner, body.fields).await
    }

    fn parse_update_body(&self, body: &Value) -> OrganizationBody {
        parse_body(body)
    }

    async fn validate_update(
        &self,
        session: &Session,
        id: &str,
        body: OrganizationBody,
    ) -> Validation<ValidatedOrganizationUpdate, UpdateOrganizationErrors> {
        let authorized = match validate_uuid(id) {
            Validation::Valid(target) => {
                permissions::update_organization(self.organizations.as_ref(), session, target)
                    .await
            }
            // Malformed ids resolve to no owner; admins fall through to the
            // id error below.
            Validation::Invalid(_) => permissions::is_admin(session),
        };
        if !authorized {
            return invalid(UpdateOrganizationErrors {
                permissions: Some(permission_messages()),
                ..Default::default()
            });
        }

        let organization = validate_organization_id(self.organizations.as_ref(), id).await;
        let fields = validate_organization_body(self.files.as_ref(), &body).await;
        match (organization, fields) {
            (Validation::Valid(organization), Validation::Valid(fields)) => {
                valid(ValidatedOrganizationUpdate {
                    id: organization.id,
                    fields,
                })
            }
            (organization, fields) => invalid(UpdateOrganizationErrors {
                permissions: None,
                id: organization.err(),
                fields: fields.err_or(OrganizationFieldErrors::default()),
            }),
        }
    }

    async fn update(
        &self,
        _session: &Session,
        body: ValidatedOrganizationUpdate,
    ) -> Result<Organization, RepositoryError> {
        self.organizations
            .update(OrganizationUpdate {
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
    ) -> Validation<Organization, DeleteOrganizationErrors> {
        let authorized = match validate_uuid(id) {
            Validation::Valid(target) => {
                permissions::delete_organization(self.organizations.as_ref(), session, target)
                    .await
            }
            Validation::Invalid(_) => permissions::is_admin(session),
        };
        if !authorized {
            return invalid(DeleteOrganizationErrors {
                permissions: Some(permission_messages()),
                not_found: None,
            });
        }
        match validate_organization_id(self.organizations.as_ref(), id).await {
            Validation::Valid(organization) => valid(organization),
            Validation::Invalid(_) => invalid(DeleteOrganizationErrors {
                permissions: None,
                not_found: Some(vec!["Organization not found.".to_owned()]),
            }),
        }
    }

    async fn delete(
        &self,
        session: &Session,
        organization: Organization,
    ) -> Result<Organization, RepositoryError> {
        let actor = session
            .user_id()
            .ok_or_else(|| RepositoryError::query("delete without authenticated session"))?;
        // Mark the organization inactive; the row stays.
        self.organizations
            .update(OrganizationUpdate {
                id: organization.id,
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
#[path = "organizations_tests.rs"]
mod tests;
