//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. They exist to satisfy Diesel's type requirements for queries
//! and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{files, opportunities, opportunity_addenda, organizations, users};

// ---------------------------------------------------------------------------
// User models
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub user_type: String,
    pub name: String,
    pub email: String,
    pub job_title: Option<String>,
    pub active: bool,
    pub deactivated_on: Option<DateTime<Utc>>,
    pub deactivated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub user_type: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub job_title: Option<&'a str>,
}

/// Changeset replacing a user's editable fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChanges<'a> {
    pub user_type: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub job_title: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset stamping a user inactive.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserDeactivation {
    pub active: bool,
    pub deactivated_on: DateTime<Utc>,
    pub deactivated_by: Uuid,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Organization models
// ---------------------------------------------------------------------------

/// Row struct for reading from the organizations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = organizations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrganizationRow {
    pub id: Uuid,
    pub legal_name: String,
    pub logo_image_file: Option<Uuid>,
    pub website_url: Option<String>,
    pub street_address1: String,
    pub street_address2: Option<String>,
    pub city: String,
    pub region: String,
    pub mail_code: String,
    pub country: String,
    pub contact_name: String,
    pub contact_title: Option<String>,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub owner_id: Uuid,
    pub active: bool,
    pub deactivated_on: Option<DateTime<Utc>>,
    pub deactivated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating organization records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = organizations)]
pub(crate) struct NewOrganizationRow<'a> {
    pub id: Uuid,
    pub legal_name: &'a str,
    pub logo_image_file: Option<Uuid>,
    pub website_url: Option<&'a str>,
    pub street_address1: &'a str,
    pub street_address2: Option<&'a str>,
    pub city: &'a str,
    pub region: &'a str,
    pub mail_code: &'a str,
    pub country: &'a str,
    pub contact_name: &'a str,
    pub contact_title: Option<&'a str>,
    pub contact_email: &'a str,
    pub contact_phone: Option<&'a str>,
    pub owner_id: Uuid,
}

/// Changeset replacing an organization's editable fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = organizations)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct OrganizationChanges<'a> {
    pub legal_name: &'a str,
    pub logo_image_file: Option<Uuid>,
    pub website_url: Option<&'a str>,
    pub street_address1: &'a str,
    pub street_address2: Option<&'a str>,
    pub city: &'a str,
    pub region: &'a str,
    pub mail_code: &'a str,
    pub country: &'a str,
    pub contact_name: &'a str,
    pub contact_title: Option<&'a str>,
    pub contact_email: &'a str,
    pub contact_phone: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset stamping an organization inactive.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = organizations)]
pub(crate) struct OrganizationDeactivation {
    pub active: bool,
    pub deactivated_on: DateTime<Utc>,
    pub deactivated_by: Uuid,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Opportunity models
// ---------------------------------------------------------------------------

/// Row struct for reading from the opportunities table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = opportunities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OpportunityRow {
    pub id: Uuid,
    pub title: String,
    pub teaser: Option<String>,
    pub description: String,
    pub location: String,
    pub reward: i64,
    pub skills: Vec<String>,
    pub remote_ok: bool,
    pub remote_desc: Option<String>,
    pub proposal_deadline: DateTime<Utc>,
    pub assignment_date: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub completion_date: Option<DateTime<Utc>>,
    pub submission_info: Option<String>,
    pub acceptance_criteria: String,
    pub evaluation_criteria: String,
    pub status: String,
    pub author_id: Uuid,
    pub active: bool,
    pub deactivated_on: Option<DateTime<Utc>>,
    pub deactivated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating opportunity records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = opportunities)]
pub(crate) struct NewOpportunityRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub teaser: Option<&'a str>,
    pub description: &'a str,
    pub location: &'a str,
    pub reward: i64,
    pub skills: &'a [String],
    pub remote_ok: bool,
    pub remote_desc: Option<&'a str>,
    pub proposal_deadline: DateTime<Utc>,
    pub assignment_date: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub completion_date: Option<DateTime<Utc>>,
    pub submission_info: Option<&'a str>,
    pub acceptance_criteria: &'a str,
    pub evaluation_criteria: &'a str,
    pub status: &'a str,
    pub author_id: Uuid,
}

/// Changeset replacing an opportunity's editable fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = opportunities)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct OpportunityChanges<'a> {
    pub title: &'a str,
    pub teaser: Option<&'a str>,
    pub description: &'a str,
    pub location: &'a str,
    pub reward: i64,
    pub skills: &'a [String],
    pub remote_ok: bool,
    pub remote_desc: Option<&'a str>,
    pub proposal_deadline: DateTime<Utc>,
    pub assignment_date: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub completion_date: Option<DateTime<Utc>>,
    pub submission_info: Option<&'a str>,
    pub acceptance_criteria: &'a str,
    pub evaluation_criteria: &'a str,
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

/// Changeset stamping an opportunity inactive.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = opportunities)]
pub(crate) struct OpportunityDeactivation {
    pub active: bool,
    pub deactivated_on: DateTime<Utc>,
    pub deactivated_by: Uuid,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the opportunity_addenda table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = opportunity_addenda)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AddendumRow {
    pub id: Uuid,
    #[allow(dead_code, reason = "read via the parent filter, kept for shape parity")]
    pub opportunity_id: Uuid,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

/// Insertable struct for appending addenda.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = opportunity_addenda)]
pub(crate) struct NewAddendumRow<'a> {
    pub id: Uuid,
    pub opportunity_id: Uuid,
    pub description: &'a str,
    pub created_by: Uuid,
}

// ---------------------------------------------------------------------------
// File models
// ---------------------------------------------------------------------------

/// Row struct for reading from the files table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FileRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for registering file metadata.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = files)]
pub(crate) struct NewFileRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
}
