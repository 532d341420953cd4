//! OpenAPI document assembled from handler annotations and schemas.

use utoipa::OpenApi;

/// Public OpenAPI surface used by Swagger UI and tooling.
///
/// The CRUD resources are registered through generic handlers, so their
/// schemas are listed here directly; the concrete session and health
/// handlers contribute annotated paths.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Procurement Marketplace API",
        description = "REST backend for organizations, opportunities and users."
    ),
    paths(
        crate::inbound::http::sessions::create_session,
        crate::inbound::http::sessions::read_current_session,
        crate::inbound::http::sessions::delete_current_session,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ready,
    ),
    components(schemas(
        crate::domain::session::Session,
        crate::domain::user::User,
        crate::domain::user::UserType,
        crate::domain::file::FileRecord,
        crate::domain::organization::Organization,
        crate::domain::organization::OrganizationOwner,
        crate::domain::organization::OrganizationSlim,
        crate::domain::opportunity::Opportunity,
        crate::domain::opportunity::OpportunitySlim,
        crate::domain::opportunity::OpportunityStatus,
        crate::domain::opportunity::Addendum,
        crate::inbound::http::sessions::LoginRequest,
    )),
    tags(
        (name = "sessions", description = "Authentication and the current session"),
        (name = "organizations", description = "Vendor organizations"),
        (name = "opportunities", description = "Code-With-Us opportunities"),
        (name = "users", description = "Marketplace users"),
        (name = "health", description = "Probes"),
    )
)]
pub struct ApiDoc;
