//! Driven port for organization persistence, with an in-memory
//! implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{Deactivation, RepositoryError};
use crate::domain::organization::{
    Organization, OrganizationOwner, OrganizationSlim, ValidatedOrganizationBody,
};
use crate::domain::permissions;
use crate::domain::session::Session;
use crate::domain::user::User;

/// Partial update applied to a stored organization.
#[derive(Debug, Clone)]
pub struct OrganizationUpdate {
    pub id: Uuid,
    /// Replacement field values, when the update edits the record.
    pub fields: Option<ValidatedOrganizationBody>,
    /// Soft-deactivation stamp, when the update retires the record.
    pub deactivation: Option<Deactivation>,
}

/// Persistence operations for organizations.
///
/// `read_many` lists active organizations; owner details are attached only
/// for admins, or on records the session user owns.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn read_many(&self, session: &Session)
    -> Result<Vec<OrganizationSlim>, RepositoryError>;
    async fn read_one(&self, id: Uuid) -> Result<Option<Organization>, RepositoryError>;
    async fn create(
        &self,
        owner: &User,
        body: ValidatedOrganizationBody,
    ) -> Result<Organization, RepositoryError>;
    async fn update(&self, update: OrganizationUpdate) -> Result<Organization, RepositoryError>;
}

/// In-memory organization store used by tests and the database-less dev
/// server.
#[derive(Debug, Default)]
pub struct InMemoryOrganizationRepository {
    rows: Mutex<HashMap<Uuid, Organization>>,
}

impl InMemoryOrganizationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Organization>>, RepositoryError> {
        self.rows
            .lock()
            .map_err(|_| RepositoryError::connection("organization store lock poisoned"))
    }
}

fn apply_fields(organization: &mut Organization, fields: ValidatedOrganizationBody) {
    organization.legal_name = fields.legal_name;
    organization.logo_image_file = fields.logo_image_file;
    organization.website_url = fields.website_url;
    organization.street_address1 = fields.street_address1;
    organization.street_address2 = fields.street_address2;
    organization.city = fields.city;
    organization.region = fields.region;
    organization.mail_code = fields.mail_code;
    organization.country = fields.country;
    organization.contact_name = fields.contact_name;
    organization.contact_title = fields.contact_title;
    organization.contact_email = fields.contact_email;
    organization.contact_phone = fields.contact_phone;
}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn read_many(
        &self,
        session: &Session,
    ) -> Result<Vec<OrganizationSlim>, RepositoryError> {
        let rows = self.lock()?;
        let admin = permissions::is_admin(session);
        let viewer = session.user_id();
        let mut listed: Vec<OrganizationSlim> = rows
            .values()
            .filter(|organization| organization.active)
            .map(|organization| {
                let visible_owner = admin || viewer == Some(organization.owner.id);
                OrganizationSlim {
                    id: organization.id,
                    legal_name: organization.legal_name.clone(),
                    logo_image_file: organization.logo_image_file,
                    active: organization.active,
                    owner: visible_owner.then(|| organization.owner.clone()),
                }
            })
            .collect();
        listed.sort_by(|a, b| a.legal_name.cmp(&b.legal_name));
        Ok(listed)
    }

    async fn read_one(&self, id: Uuid) -> Result<Option<Organization>, RepositoryError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn create(
        &self,
        owner: &User,
        body: ValidatedOrganizationBody,
    ) -> Result<Organization, RepositoryError> {
        let now = Utc::now();
        let organization = Organization {
            id: Uuid::new_v4(),
            legal_name: body.legal_name,
            logo_image_file: body.logo_image_file,
            website_url: body.website_url,
            street_address1: body.street_address1,
            street_address2: body.street_address2,
            city: body.city,
            region: body.region,
            mail_code: body.mail_code,
            country: body.country,
            contact_name: body.contact_name,
            contact_title: body.contact_title,
            contact_email: body.contact_email,
            contact_phone: body.contact_phone,
            owner: OrganizationOwner {
                id: owner.id,
                name: owner.name.clone(),
            },
            active: true,
            deactivated_on: None,
            deactivated_by: None,
            created_at: now,
            updated_at: now,
        };
        tracing::info!(organization = %organization.id, owner = %owner.id, "organization created");
        self.lock()?.insert(organization.id, organization.clone());
        Ok(organization)
    }

    async fn update(&self, update: OrganizationUpdate) -> Result<Organization, RepositoryError> {
        let mut rows = self.lock()?;
        let organization = rows
            .get_mut(&update.id)
            .ok_or_else(|| RepositoryError::query("organization not found"))?;
        if let Some(fields) = update.fields {
            apply_fields(organization, fields);
        }
        if let Some(deactivation) = update.deactivation {
            // Repeat deactivations keep the original audit stamp.
            if organization.active {
                organization.active = false;
                organization.deactivated_on = Some(deactivation.on);
                organization.deactivated_by = Some(deactivation.by);
            }
        }
        organization.updated_at = Utc::now();
        tracing::info!(organization = %organization.id, "organization updated");
        Ok(organization.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserType;
    use rstest::rstest;

    fn owner(name: &str, user_type: UserType) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            user_type,
            name: name.to_owned(),
            email: format!("{}@example.com", name.to_lowercase()),
            job_title: None,
            active: true,
            deactivated_on: None,
            deactivated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn body(legal_name: &str) -> ValidatedOrganizationBody {
        ValidatedOrganizationBody {
            legal_name: legal_name.to_owned(),
            logo_image_file: None,
            website_url: None,
            street_address1: "800 Main St".to_owned(),
            street_address2: None,
            city: "Victoria".to_owned(),
            region: "BC".to_owned(),
            mail_code: "V8W 1A1".to_owned(),
            country: "Canada".to_owned(),
            contact_name: "Pat Vendor".to_owned(),
            contact_title: None,
            contact_email: "pat@example.com".to_owned(),
            contact_phone: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn listing_redacts_owner_for_outsiders() {
        let repo = InMemoryOrganizationRepository::new();
        let vendor = owner("Pat", UserType::Vendor);
        let admin = owner("Admin", UserType::Admin);
        repo.create(&vendor, body("Acme")).await.expect("create");

        let as_admin = repo
            .read_many(&Session::authenticated(admin))
            .await
            .expect("admin listing");
        assert!(as_admin[0].owner.is_some());

        let as_owner = repo
            .read_many(&Session::authenticated(vendor))
            .await
            .expect("owner listing");
        assert!(as_owner[0].owner.is_some());

        let as_stranger = repo
            .read_many(&Session::authenticated(owner("Other", UserType::Vendor)))
            .await
            .expect("stranger listing");
        assert!(as_stranger[0].owner.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn deactivated_organizations_drop_out_of_listings_but_still_resolve() {
        let repo = InMemoryOrganizationRepository::new();
        let vendor = owner("Pat", UserType::Vendor);
        let created = repo.create(&vendor, body("Acme")).await.expect("create");

        repo.update(OrganizationUpdate {
            id: created.id,
            fields: None,
            deactivation: Some(Deactivation {
                on: Utc::now(),
                by: vendor.id,
            }),
        })
        .await
        .expect("deactivate");

        let listed = repo
            .read_many(&Session::anonymous())
            .await
            .expect("listing");
        assert!(listed.is_empty());

        let fetched = repo.read_one(created.id).await.expect("read one");
        assert!(fetched.is_some_and(|organization| !organization.active));
    }
}
