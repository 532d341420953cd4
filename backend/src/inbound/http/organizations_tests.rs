//! End-to-end coverage for the organizations resource.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use async_trait::async_trait;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::organization::{Organization, OrganizationSlim, ValidatedOrganizationBody};
use crate::domain::ports::{
    FileRepository, OrganizationRepository, OrganizationUpdate, RepositoryError,
};
use crate::domain::session::Session;
use crate::domain::user::{User, UserType};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::test_utils::{api_test_app, login_cookie, seed_user};

fn valid_body() -> Value {
    json!({
        "legalName": "Acme Consulting Ltd.",
        "websiteUrl": "https://acme.example.com",
        "streetAddress1": "800 Main St",
        "streetAddress2": "Suite 200",
        "city": "Victoria",
        "region": "BC",
        "mailCode": "V8W 1A1",
        "country": "Canada",
        "contactName": "Pat Vendor",
        "contactTitle": "CEO",
        "contactEmail": "pat@acme.example.com",
        "contactPhone": "+1 604 555 0199"
    })
}

async fn setup() -> (HttpState, User, User, User) {
    let state = HttpState::in_memory("password");
    let admin = seed_user(&state, UserType::Admin, "Avery Admin", "admin@example.com").await;
    let owner = seed_user(&state, UserType::Vendor, "Pat Vendor", "pat@example.com").await;
    let stranger = seed_user(&state, UserType::Vendor, "Sam Stranger", "sam@example.com").await;
    (state, admin, owner, stranger)
}

#[actix_web::test]
async fn create_collects_field_errors_without_blocking_each_other() {
    let (state, _, owner, _) = setup().await;
    let app = actix_test::init_service(api_test_app(state, 70_000)).await;
    let cookie = login_cookie(&app, &owner.email).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/organizations")
            .cookie(cookie)
            .set_json(json!({ "legalName": "Acme", "contactEmail": "bad-email" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors: Value = actix_test::read_body_json(response).await;

    // The field that passed stays out of the map.
    assert!(errors.get("legalName").is_none());
    assert_eq!(
        errors.get("contactEmail").and_then(Value::as_array),
        Some(&vec![json!("Please enter a valid email address.")])
    );
    for key in ["streetAddress1", "city", "region", "mailCode", "country", "contactName"] {
        let messages = errors
            .get(key)
            .and_then(Value::as_array)
            .unwrap_or_else(|| panic!("expected errors under {key}"));
        assert!(!messages.is_empty());
    }
    // Optional fields left empty are not errors.
    assert!(errors.get("streetAddress2").is_none());
    assert!(errors.get("contactPhone").is_none());
    assert!(errors.get("websiteUrl").is_none());
}

#[actix_web::test]
async fn create_requires_permission_before_validation_and_persists_nothing() {
    let (state, admin, _, _) = setup().await;
    let organizations = state.organizations.clone();
    let app = actix_test::init_service(api_test_app(state, 70_000)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/organizations")
            .set_json(valid_body())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors: Value = actix_test::read_body_json(response).await;
    let messages = errors
        .get("permissions")
        .and_then(Value::as_array)
        .expect("permissions key");
    assert!(!messages.is_empty());
    // Permission failure reports nothing about fields.
    assert!(errors.get("streetAddress1").is_none());

    let listed = organizations
        .read_many(&Session::authenticated(admin))
        .await
        .expect("listing");
    assert!(listed.is_empty());
}

#[actix_web::test]
async fn created_organizations_round_trip_through_read_one() {
    let (state, _, owner, _) = setup().await;
    let logo = state.files.create("logo.png").await.expect("seed file");
    let app = actix_test::init_service(api_test_app(state, 70_000)).await;
    let cookie = login_cookie(&app, &owner.email).await;

    let mut body = valid_body();
    if let Some(map) = body.as_object_mut() {
        map.insert("logoImageFile".to_owned(), json!(logo.id));
    }
    let created_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/organizations")
            .cookie(cookie.clone())
            .set_json(&body)
            .to_request(),
    )
    .await;
    assert_eq!(created_res.status(), StatusCode::CREATED);
    let created: Organization = actix_test::read_body_json(created_res).await;
    assert_eq!(created.legal_name, "Acme Consulting Ltd.");
    assert_eq!(created.logo_image_file, Some(logo.id));
    assert_eq!(created.owner.id, owner.id);
    assert!(created.active);

    let read_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/organizations/{}", created.id))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(read_res.status(), StatusCode::OK);
    let fetched: Organization = actix_test::read_body_json(read_res).await;
    assert_eq!(fetched, created);
}

#[actix_web::test]
async fn create_rejects_unknown_logo_references() {
    let (state, _, owner, _) = setup().await;
    let app = actix_test::init_service(api_test_app(state, 70_000)).await;
    let cookie = login_cookie(&app, &owner.email).await;

    let mut body = valid_body();
    if let Some(map) = body.as_object_mut() {
        map.insert("logoImageFile".to_owned(), json!(Uuid::new_v4()));
    }
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/organizations")
            .cookie(cookie)
            .set_json(&body)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        errors.get("logoImageFile").and_then(Value::as_array),
        Some(&vec![json!("The specified file was not found.")])
    );
}

#[actix_web::test]
async fn read_one_maps_each_failure_to_its_status() {
    let (state, admin, owner, stranger) = setup().await;
    let app = actix_test::init_service(api_test_app(state, 70_000)).await;
    let owner_cookie = login_cookie(&app, &owner.email).await;

    let created: Organization = actix_test::read_body_json(
        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/organizations")
                .cookie(owner_cookie)
                .set_json(valid_body())
                .to_request(),
        )
        .await,
    )
    .await;

    // Malformed id.
    let bad_id = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/organizations/not-a-uuid")
            .to_request(),
    )
    .await;
    assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);
    let errors: Value = actix_test::read_body_json(bad_id).await;
    assert_eq!(
        errors.get("id").and_then(Value::as_array),
        Some(&vec![json!("Invalid identifier provided.")])
    );

    // Neither anonymous callers nor unrelated vendors see full records.
    let anonymous = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/organizations/{}", created.id))
            .to_request(),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let stranger_cookie = login_cookie(&app, &stranger.email).await;
    let outsider = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/organizations/{}", created.id))
            .cookie(stranger_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(outsider.status(), StatusCode::UNAUTHORIZED);

    // Admins get a 404 for records that do not exist.
    let admin_cookie = login_cookie(&app, &admin.email).await;
    let missing = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/organizations/{}", Uuid::new_v4()))
            .cookie(admin_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let errors: Value = actix_test::read_body_json(missing).await;
    assert_eq!(
        errors.get("notFound").and_then(Value::as_array),
        Some(&vec![json!("Organization not found.")])
    );
}

#[actix_web::test]
async fn update_parses_the_contact_phone_key() {
    let (state, _, owner, _) = setup().await;
    let app = actix_test::init_service(api_test_app(state, 70_000)).await;
    let cookie = login_cookie(&app, &owner.email).await;

    let created: Organization = actix_test::read_body_json(
        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/organizations")
                .cookie(cookie.clone())
                .set_json(valid_body())
                .to_request(),
        )
        .await,
    )
    .await;

    let mut body = valid_body();
    if let Some(map) = body.as_object_mut() {
        map.insert("contactPhone".to_owned(), json!("(250) 555-0100"));
    }
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/organizations/{}", created.id))
            .cookie(cookie)
            .set_json(&body)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Organization = actix_test::read_body_json(response).await;
    assert_eq!(updated.contact_phone.as_deref(), Some("(250) 555-0100"));
}

#[actix_web::test]
async fn update_applies_the_all_or_nothing_contract() {
    let (state, _, owner, stranger) = setup().await;
    let app = actix_test::init_service(api_test_app(state, 70_000)).await;
    let owner_cookie = login_cookie(&app, &owner.email).await;

    let created: Organization = actix_test::read_body_json(
        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/organizations")
                .cookie(owner_cookie.clone())
                .set_json(valid_body())
                .to_request(),
        )
        .await,
    )
    .await;

    // A non-owner is told about permissions, not fields.
    let stranger_cookie = login_cookie(&app, &stranger.email).await;
    let forbidden = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/organizations/{}", created.id))
            .cookie(stranger_cookie)
            .set_json(valid_body())
            .to_request(),
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::BAD_REQUEST);
    let errors: Value = actix_test::read_body_json(forbidden).await;
    assert!(errors.get("permissions").is_some());

    // One bad field rejects the whole update and nothing is written.
    let mut body = valid_body();
    if let Some(map) = body.as_object_mut() {
        map.insert("contactEmail".to_owned(), json!("nope"));
        map.insert("legalName".to_owned(), json!("Changed Name Ltd."));
    }
    let rejected = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/organizations/{}", created.id))
            .cookie(owner_cookie.clone())
            .set_json(&body)
            .to_request(),
    )
    .await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    let errors: Value = actix_test::read_body_json(rejected).await;
    assert!(errors.get("contactEmail").is_some());
    assert!(errors.get("legalName").is_none());

    let fetched: Organization = actix_test::read_body_json(
        actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/organizations/{}", created.id))
                .cookie(owner_cookie)
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(fetched.legal_name, "Acme Consulting Ltd.");
}

#[actix_web::test]
async fn delete_soft_deactivates_and_tolerates_repeats() {
    let (state, _, owner, stranger) = setup().await;
    let app = actix_test::init_service(api_test_app(state, 70_000)).await;
    let owner_cookie = login_cookie(&app, &owner.email).await;

    let created: Organization = actix_test::read_body_json(
        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/organizations")
                .cookie(owner_cookie.clone())
                .set_json(valid_body())
                .to_request(),
        )
        .await,
    )
    .await;

    // A non-owner cannot deactivate, and the record stays live.
    let stranger_cookie = login_cookie(&app, &stranger.email).await;
    let forbidden = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/organizations/{}", created.id))
            .cookie(stranger_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::BAD_REQUEST);
    let errors: Value = actix_test::read_body_json(forbidden).await;
    assert!(errors.get("permissions").is_some());

    let still_live: Organization = actix_test::read_body_json(
        actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/organizations/{}", created.id))
                .cookie(owner_cookie.clone())
                .to_request(),
        )
        .await,
    )
    .await;
    assert!(still_live.active);

    // The owner deactivates; the audit stamp lands.
    let deleted_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/organizations/{}", created.id))
            .cookie(owner_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(deleted_res.status(), StatusCode::OK);
    let deleted: Organization = actix_test::read_body_json(deleted_res).await;
    assert!(!deleted.active);
    assert!(deleted.deactivated_on.is_some());
    assert_eq!(deleted.deactivated_by, Some(owner.id));

    // Repeat deletes still answer 200 and keep the original stamp.
    let repeat_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/organizations/{}", created.id))
            .cookie(owner_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(repeat_res.status(), StatusCode::OK);
    let repeated: Organization = actix_test::read_body_json(repeat_res).await;
    assert!(!repeated.active);
    assert_eq!(repeated.deactivated_on, deleted.deactivated_on);
}

#[actix_web::test]
async fn listing_redacts_owner_details_per_session() {
    let (state, admin, owner, stranger) = setup().await;
    let app = actix_test::init_service(api_test_app(state, 70_000)).await;
    let owner_cookie = login_cookie(&app, &owner.email).await;

    actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/organizations")
            .cookie(owner_cookie)
            .set_json(valid_body())
            .to_request(),
    )
    .await;

    let stranger_cookie = login_cookie(&app, &stranger.email).await;
    let as_stranger: Vec<OrganizationSlim> = actix_test::read_body_json(
        actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/organizations")
                .cookie(stranger_cookie)
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(as_stranger.len(), 1);
    assert!(as_stranger[0].owner.is_none());

    let admin_cookie = login_cookie(&app, &admin.email).await;
    let as_admin: Vec<OrganizationSlim> = actix_test::read_body_json(
        actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/organizations")
                .cookie(admin_cookie)
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(
        as_admin[0].owner.as_ref().map(|o| o.id),
        Some(owner.id)
    );
}

/// Repository double whose every call fails, for the 503 contract.
struct FailingOrganizationRepository;

#[async_trait]
impl OrganizationRepository for FailingOrganizationRepository {
    async fn read_many(
        &self,
        _session: &Session,
    ) -> Result<Vec<OrganizationSlim>, RepositoryError> {
        Err(RepositoryError::connection("store offline"))
    }

    async fn read_one(&self, _id: Uuid) -> Result<Option<Organization>, RepositoryError> {
        Err(RepositoryError::connection("store offline"))
    }

    async fn create(
        &self,
        _owner: &User,
        _body: ValidatedOrganizationBody,
    ) -> Result<Organization, RepositoryError> {
        Err(RepositoryError::connection("store offline"))
    }

    async fn update(&self, _update: OrganizationUpdate) -> Result<Organization, RepositoryError> {
        Err(RepositoryError::connection("store offline"))
    }
}

#[actix_web::test]
async fn store_failures_surface_as_opaque_database_errors() {
    let base = HttpState::in_memory("password");
    seed_user(&base, UserType::Vendor, "Pat Vendor", "pat@example.com").await;
    let state = HttpState::new(
        base.users.clone(),
        Arc::new(FailingOrganizationRepository),
        base.opportunities.clone(),
        base.files.clone(),
        base.login.clone(),
    );
    let app = actix_test::init_service(api_test_app(state, 70_000)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/organizations")
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let errors: Value = actix_test::read_body_json(response).await;
    let messages = errors
        .get("database")
        .and_then(Value::as_array)
        .expect("database key");
    // The underlying cause never reaches the caller.
    assert!(!messages[0].as_str().unwrap_or_default().contains("offline"));
}
