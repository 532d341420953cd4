//! Organization data model and field validation.
//!
//! Organizations are vendor-owned records with a postal address and a
//! contact block. Deleting one is a soft-deactivation: the row survives
//! with `active = false` and an audit stamp, permanently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ports::{FileRepository, OrganizationRepository, RepositoryError};
use super::validation::{Validation, invalid, optional_async, valid};
use super::validators::{
    validate_email, validate_generic_string, validate_optional_phone, validate_optional_string,
    validate_optional_url, validate_uuid,
};
use crate::domain::file::validate_file_record;

/// Maximum length of an organization's legal name.
pub const LEGAL_NAME_MAX: usize = 300;
/// Maximum length of each address line.
pub const ADDRESS_MAX: usize = 200;
/// Maximum length of city, region and country names.
pub const LOCALITY_MAX: usize = 100;
/// Maximum length of a postal / ZIP code.
pub const MAIL_CODE_MAX: usize = 30;
/// Maximum length of the contact's name.
pub const CONTACT_NAME_MAX: usize = 100;
/// Maximum length of the contact's title.
pub const CONTACT_TITLE_MAX: usize = 150;

/// The user who created (and owns) an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationOwner {
    pub id: Uuid,
    pub name: String,
}

/// A persisted organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub legal_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_image_file: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    pub street_address1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address2: Option<String>,
    pub city: String,
    pub region: String,
    pub mail_code: String,
    pub country: String,
    pub contact_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_title: Option<String>,
    pub contact_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    pub owner: OrganizationOwner,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing view of an organization.
///
/// Owner details are redacted for callers without a stake in the record;
/// the repository decides per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSlim {
    pub id: Uuid,
    pub legal_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_image_file: Option<Uuid>,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OrganizationOwner>,
}

/// Raw organization payload lifted tolerantly from a request body.
///
/// Missing or malformed fields coerce to empty strings (or `None` for the
/// logo reference) so validation sees every field exactly once.
#[derive(Debug, Default, Clone)]
pub struct OrganizationBody {
    pub legal_name: String,
    pub logo_image_file: Option<String>,
    pub website_url: String,
    pub street_address1: String,
    pub street_address2: String,
    pub city: String,
    pub region: String,
    pub mail_code: String,
    pub country: String,
    pub contact_name: String,
    pub contact_title: String,
    pub contact_email: String,
    pub contact_phone: String,
}

/// Entity-shaped organization payload produced once every field validates.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrganizationBody {
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
}

/// Field-level error map for organization payloads.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationFieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_image_file: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address1: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address2: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_code: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_title: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<Vec<String>>,
}

/// Error body for `POST /organizations`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(flatten)]
    pub fields: OrganizationFieldErrors,
}

/// Error body for `PUT /organizations/{id}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Vec<String>>,
    #[serde(flatten)]
    pub fields: OrganizationFieldErrors,
}

/// Error body for `DELETE /organizations/{id}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOrganizationErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_found: Option<Vec<String>>,
}

/// Validate an organization's legal name.
pub fn validate_legal_name(raw: &str) -> Validation<String> {
    validate_generic_string(raw, "Legal name", 1, LEGAL_NAME_MAX)
}

/// Validate the first street address line.
pub fn validate_street_address1(raw: &str) -> Validation<String> {
    validate_generic_string(raw, "Street address", 1, ADDRESS_MAX)
}

/// Validate the optional second street address line.
pub fn validate_street_address2(raw: &str) -> Validation<Option<String>> {
    validate_optional_string(raw, "Street address", ADDRESS_MAX)
}

/// Validate the city name.
pub fn validate_city(raw: &str) -> Validation<String> {
    validate_generic_string(raw, "City", 1, LOCALITY_MAX)
}

/// Validate the region / province / state name.
pub fn validate_region(raw: &str) -> Validation<String> {
    validate_generic_string(raw, "Region", 1, LOCALITY_MAX)
}

/// Validate the postal / ZIP code.
pub fn validate_mail_code(raw: &str) -> Validation<String> {
    validate_generic_string(raw, "Postal code", 1, MAIL_CODE_MAX)
}

/// Validate the country name.
pub fn validate_country(raw: &str) -> Validation<String> {
    validate_generic_string(raw, "Country", 1, LOCALITY_MAX)
}

/// Validate the contact's name.
pub fn validate_contact_name(raw: &str) -> Validation<String> {
    validate_generic_string(raw, "Contact name", 1, CONTACT_NAME_MAX)
}

/// Validate the contact's optional title.
pub fn validate_contact_title(raw: &str) -> Validation<Option<String>> {
    validate_optional_string(raw, "Contact title", CONTACT_TITLE_MAX)
}

/// Validate the contact's email address.
pub fn validate_contact_email(raw: &str) -> Validation<String> {
    validate_email(raw)
}

/// Validate the contact's optional phone number.
pub fn validate_contact_phone(raw: &str) -> Validation<Option<String>> {
    validate_optional_phone(raw)
}

/// Validate the optional website URL.
pub fn validate_website_url(raw: &str) -> Validation<Option<String>> {
    validate_optional_url(raw)
}

/// Run every organization field validator and combine the outcomes.
///
/// All validators run regardless of earlier failures so the error map
/// reports every failing field in one pass. The logo reference performs the
/// single awaited lookup.
pub async fn validate_organization_body(
    files: &dyn FileRepository,
    body: &OrganizationBody,
) -> Validation<ValidatedOrganizationBody, OrganizationFieldErrors> {
    use Validation::Valid;

    let legal_name = validate_legal_name(&body.legal_name);
    let logo_image_file = optional_async(body.logo_image_file.as_deref(), |raw| {
        validate_file_record(files, raw)
    })
    .await;
    let website_url = validate_website_url(&body.website_url);
    let street_address1 = validate_street_address1(&body.street_address1);
    let street_address2 = validate_street_address2(&body.street_address2);
    let city = validate_city(&body.city);
    let region = validate_region(&body.region);
    let mail_code = validate_mail_code(&body.mail_code);
    let country = validate_country(&body.country);
    let contact_name = validate_contact_name(&body.contact_name);
    let contact_title = validate_contact_title(&body.contact_title);
    let contact_email = validate_contact_email(&body.contact_email);
    let contact_phone = validate_contact_phone(&body.contact_phone);

    match (
        legal_name,
        logo_image_file,
        website_url,
        street_address1,
        street_address2,
        city,
        region,
        mail_code,
        country,
        contact_name,
        contact_title,
        contact_email,
        contact_phone,
    ) {
        (
            Valid(legal_name),
            Valid(logo_image_file),
            Valid(website_url),
            Valid(street_address1),
            Valid(street_address2),
            Valid(city),
            Valid(region),
            Valid(mail_code),
            Valid(country),
            Valid(contact_name),
            Valid(contact_title),
            Valid(contact_email),
            Valid(contact_phone),
        ) => valid(ValidatedOrganizationBody {
            legal_name,
            logo_image_file: logo_image_file.map(|record| record.id),
            website_url,
            street_address1,
            street_address2,
            city,
            region,
            mail_code,
            country,
            contact_name,
            contact_title,
            contact_email,
            contact_phone,
        }),
        (
            legal_name,
            logo_image_file,
            website_url,
            street_address1,
            street_address2,
            city,
            region,
            mail_code,
            country,
            contact_name,
            contact_title,
            contact_email,
            contact_phone,
        ) => invalid(OrganizationFieldErrors {
            legal_name: legal_name.err(),
            logo_image_file: logo_image_file.err(),
            website_url: website_url.err(),
            street_address1: street_address1.err(),
            street_address2: street_address2.err(),
            city: city.err(),
            region: region.err(),
            mail_code: mail_code.err(),
            country: country.err(),
            contact_name: contact_name.err(),
            contact_title: contact_title.err(),
            contact_email: contact_email.err(),
            contact_phone: contact_phone.err(),
        }),
    }
}

/// Resolve a raw organization id to its stored record.
///
/// Deactivated organizations still resolve; deactivation is not deletion.
pub async fn validate_organization_id(
    organizations: &dyn OrganizationRepository,
    raw: &str,
) -> Validation<Organization> {
    let id = match validate_uuid(raw) {
        Validation::Valid(id) => id,
        Validation::Invalid(errors) => return invalid(errors),
    };
    match organizations.read_one(id).await {
        Ok(Some(organization)) => valid(organization),
        Ok(None) => invalid(vec!["Organization not found.".to_owned()]),
        Err(RepositoryError::Connection { .. } | RepositoryError::Query { .. }) => invalid(vec![
            "Unable to verify the specified organization. Please try again later.".to_owned(),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn legal_name_bounds() {
        assert!(validate_legal_name("Acme Consulting Ltd.").is_valid());
        assert_eq!(
            validate_legal_name("").err(),
            Some(vec!["Legal name is required.".to_owned()])
        );
        let too_long = "x".repeat(LEGAL_NAME_MAX + 1);
        assert!(validate_legal_name(&too_long).is_invalid());
    }

    #[rstest]
    fn optional_fields_accept_absence() {
        assert_eq!(validate_street_address2(""), valid(None));
        assert_eq!(validate_contact_title("  "), valid(None));
        assert_eq!(validate_contact_phone(""), valid(None));
        assert_eq!(validate_website_url(""), valid(None));
    }

    #[rstest]
    fn slim_serialisation_redacts_absent_owner() {
        let slim = OrganizationSlim {
            id: Uuid::nil(),
            legal_name: "Acme".to_owned(),
            logo_image_file: None,
            active: true,
            owner: None,
        };
        let value = serde_json::to_value(&slim).expect("serialise slim organization");
        assert!(value.get("owner").is_none());
        assert!(value.get("logoImageFile").is_none());
        assert_eq!(value.get("legalName").and_then(|v| v.as_str()), Some("Acme"));
    }
}
