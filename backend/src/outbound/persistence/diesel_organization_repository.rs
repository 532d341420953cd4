//! PostgreSQL-backed `OrganizationRepository` implementation using Diesel.
//!
//! Owner names come from a join against the users table; the redaction
//! rules (owner details for admins and owners only) are applied here so
//! every caller sees the same listing shape.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::organization::{
    Organization, OrganizationOwner, OrganizationSlim, ValidatedOrganizationBody,
};
use crate::domain::permissions;
use crate::domain::ports::{
    OrganizationRepository, OrganizationUpdate, RepositoryError,
};
use crate::domain::session::Session;
use crate::domain::user::User;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    NewOrganizationRow, OrganizationChanges, OrganizationDeactivation, OrganizationRow,
};
use super::pool::DbPool;
use super::schema::{organizations, users};

/// Diesel-backed implementation of the `OrganizationRepository` port.
#[derive(Clone)]
pub struct DieselOrganizationRepository {
    pool: DbPool,
}

impl DieselOrganizationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_organization(row: OrganizationRow, owner_name: String) -> Organization {
    Organization {
        id: row.id,
        legal_name: row.legal_name,
        logo_image_file: row.logo_image_file,
        website_url: row.website_url,
        street_address1: row.street_address1,
        street_address2: row.street_address2,
        city: row.city,
        region: row.region,
        mail_code: row.mail_code,
        country: row.country,
        contact_name: row.contact_name,
        contact_title: row.contact_title,
        contact_email: row.contact_email,
        contact_phone: row.contact_phone,
        owner: OrganizationOwner {
            id: row.owner_id,
            name: owner_name,
        },
        active: row.active,
        deactivated_on: row.deactivated_on,
        deactivated_by: row.deactivated_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl OrganizationRepository for DieselOrganizationRepository {
    async fn read_many(
        &self,
        session: &Session,
    ) -> Result<Vec<OrganizationSlim>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(OrganizationRow, String)> = organizations::table
            .inner_join(users::table)
            .filter(organizations::active.eq(true))
            .order(organizations::legal_name.asc())
            .select((OrganizationRow::as_select(), users::name))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let admin = permissions::is_admin(session);
        let viewer = session.user_id();
        Ok(rows
            .into_iter()
            .map(|(row, owner_name)| {
                let visible_owner = admin || viewer == Some(row.owner_id);
                OrganizationSlim {
                    id: row.id,
                    legal_name: row.legal_name,
                    logo_image_file: row.logo_image_file,
                    active: row.active,
                    owner: visible_owner.then_some(OrganizationOwner {
                        id: row.owner_id,
                        name: owner_name,
                    }),
                }
            })
            .collect())
    }

    async fn read_one(&self, id: Uuid) -> Result<Option<Organization>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(OrganizationRow, String)> = organizations::table
            .inner_join(users::table)
            .filter(organizations::id.eq(id))
            .select((OrganizationRow::as_select(), users::name))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(|(organization, owner_name)| row_to_organization(organization, owner_name)))
    }

    async fn create(
        &self,
        owner: &User,
        body: ValidatedOrganizationBody,
    ) -> Result<Organization, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewOrganizationRow {
            id: Uuid::new_v4(),
            legal_name: &body.legal_name,
            logo_image_file: body.logo_image_file,
            website_url: body.website_url.as_deref(),
            street_address1: &body.street_address1,
            street_address2: body.street_address2.as_deref(),
            city: &body.city,
            region: &body.region,
            mail_code: &body.mail_code,
            country: &body.country,
            contact_name: &body.contact_name,
            contact_title: body.contact_title.as_deref(),
            contact_email: &body.contact_email,
            contact_phone: body.contact_phone.as_deref(),
            owner_id: owner.id,
        };

        let row: OrganizationRow = diesel::insert_into(organizations::table)
            .values(&new_row)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        tracing::info!(organization = %row.id, owner = %owner.id, "organization created");
        Ok(row_to_organization(row, owner.name.clone()))
    }

    async fn update(&self, update: OrganizationUpdate) -> Result<Organization, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        if let Some(fields) = &update.fields {
            let changes = OrganizationChanges {
                legal_name: &fields.legal_name,
                logo_image_file: fields.logo_image_file,
                website_url: fields.website_url.as_deref(),
                street_address1: &fields.street_address1,
                street_address2: fields.street_address2.as_deref(),
                city: &fields.city,
                region: &fields.region,
                mail_code: &fields.mail_code,
                country: &fields.country,
                contact_name: &fields.contact_name,
                contact_title: fields.contact_title.as_deref(),
                contact_email: &fields.contact_email,
                contact_phone: fields.contact_phone.as_deref(),
                updated_at: Utc::now(),
            };
            diesel::update(organizations::table.filter(organizations::id.eq(update.id)))
                .set(&changes)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            tracing::info!(organization = %update.id, "organization updated");
        }

        if let Some(deactivation) = update.deactivation {
            // Only the first deactivation writes a stamp.
            diesel::update(
                organizations::table
                    .filter(organizations::id.eq(update.id).and(organizations::active.eq(true))),
            )
            .set(&OrganizationDeactivation {
                active: false,
                deactivated_on: deactivation.on,
                deactivated_by: deactivation.by,
                updated_at: Utc::now(),
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        }

        let row: (OrganizationRow, String) = organizations::table
            .inner_join(users::table)
            .filter(organizations::id.eq(update.id))
            .select((OrganizationRow::as_select(), users::name))
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_organization(row.0, row.1))
    }
}
