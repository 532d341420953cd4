//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the SQL in `migrations/` exactly; Diesel
//! uses them for compile-time query validation and type-safe SQL
//! generation. Regenerate with `diesel print-schema` after changing a
//! migration.

diesel::table! {
    /// Marketplace user accounts.
    users (id) {
        id -> Uuid,
        user_type -> Varchar,
        name -> Varchar,
        email -> Varchar,
        job_title -> Nullable<Varchar>,
        active -> Bool,
        deactivated_on -> Nullable<Timestamptz>,
        deactivated_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Vendor organizations with address and contact blocks.
    organizations (id) {
        id -> Uuid,
        legal_name -> Varchar,
        logo_image_file -> Nullable<Uuid>,
        website_url -> Nullable<Varchar>,
        street_address1 -> Varchar,
        street_address2 -> Nullable<Varchar>,
        city -> Varchar,
        region -> Varchar,
        mail_code -> Varchar,
        country -> Varchar,
        contact_name -> Varchar,
        contact_title -> Nullable<Varchar>,
        contact_email -> Varchar,
        contact_phone -> Nullable<Varchar>,
        owner_id -> Uuid,
        active -> Bool,
        deactivated_on -> Nullable<Timestamptz>,
        deactivated_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Code-With-Us opportunities.
    opportunities (id) {
        id -> Uuid,
        title -> Varchar,
        teaser -> Nullable<Varchar>,
        description -> Text,
        location -> Varchar,
        reward -> Int8,
        skills -> Array<Text>,
        remote_ok -> Bool,
        remote_desc -> Nullable<Varchar>,
        proposal_deadline -> Timestamptz,
        assignment_date -> Timestamptz,
        start_date -> Timestamptz,
        completion_date -> Nullable<Timestamptz>,
        submission_info -> Nullable<Text>,
        acceptance_criteria -> Text,
        evaluation_criteria -> Text,
        status -> Varchar,
        author_id -> Uuid,
        active -> Bool,
        deactivated_on -> Nullable<Timestamptz>,
        deactivated_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only clarification notes on opportunities.
    opportunity_addenda (id) {
        id -> Uuid,
        opportunity_id -> Uuid,
        description -> Text,
        created_at -> Timestamptz,
        created_by -> Uuid,
    }
}

diesel::table! {
    /// Stored file metadata referenced by organization logos.
    files (id) {
        id -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(organizations -> users (owner_id));
diesel::joinable!(opportunities -> users (author_id));
diesel::joinable!(opportunity_addenda -> opportunities (opportunity_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    organizations,
    opportunities,
    opportunity_addenda,
    files,
);
