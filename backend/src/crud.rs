//! Generic CRUD resource contract and request lifecycle.
//!
//! Every resource (organizations, opportunities, users) implements
//! [`CrudResource`] and gets the same five operations with a uniform
//! lifecycle: `Received → Parsed → Validated{Valid | Invalid} →
//! (Persisted | Rejected)`. The generic handlers here own the lifecycle and
//! the status mapping; resources own parsing, validation and persistence
//! calls. Terminal states are the HTTP response — there is no retry, and a
//! failed store call always surfaces as the same opaque 503 body.
//!
//! Error bodies are JSON maps from field name (or `permissions` /
//! `database` / `notFound` / `id`) to arrays of messages; statuses are
//! drawn from {200, 201, 400, 401, 404, 503}.

use actix_web::{HttpResponse, Scope, web};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::Session;
use crate::domain::Validation;
use crate::domain::permissions;
use crate::domain::ports::{self, RepositoryError};
use crate::inbound::http::session::{SessionContext, SessionResolver};

/// Failure modes of the `readOne` lookup path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOneError {
    /// The path id failed format validation.
    InvalidId(Vec<String>),
    /// The session may not read this record.
    Unauthorized,
    /// No record behind a well-formed, permitted id.
    NotFound(Vec<String>),
    /// The store could not be consulted.
    Database,
}

/// The contract every CRUD resource implements.
///
/// Associated types pin down the raw body each operation parses, the
/// validated body it persists, and the error map it reports, per resource.
/// Validated bodies are consumed exactly once, by the persistence call.
#[async_trait]
pub trait CrudResource: Send + Sync + 'static {
    /// URL namespace, e.g. `organizations`.
    const NAMESPACE: &'static str;

    /// Listing view returned by `readMany`.
    type Summary: Serialize + Send;
    /// Full entity returned by `readOne`, `create`, `update` and `delete`.
    type Entity: Serialize + Send;
    /// Raw create payload, tolerantly lifted from JSON.
    type CreateBody: Send;
    /// Create payload after validation and authorization.
    type ValidatedCreateBody: Send;
    /// Field-error map for rejected creates.
    type CreateErrors: Serialize + Send;
    /// Raw update payload.
    type UpdateBody: Send;
    /// Update payload after validation and authorization.
    type ValidatedUpdateBody: Send;
    /// Field-error map for rejected updates.
    type UpdateErrors: Serialize + Send;
    /// Validated delete target (typically the entity itself).
    type ValidatedDeleteBody: Send;
    /// Error map for rejected deletes.
    type DeleteErrors: Serialize + Send;

    /// List entities accessible to the session.
    async fn read_many(&self, session: &Session)
    -> Result<Vec<Self::Summary>, RepositoryError>;

    /// Fetch one entity: id validation, then permission, then lookup.
    async fn read_one(&self, session: &Session, id: &str)
    -> Result<Self::Entity, ReadOneError>;

    /// Lift the raw JSON body into the resource's create shape. Tolerant:
    /// missing or malformed fields coerce to empty values.
    fn parse_create_body(&self, body: &Value) -> Self::CreateBody;

    /// Validate a create payload. Permission failures come back as
    /// `Invalid` with a `permissions` key, before field validation runs.
    async fn validate_create(
        &self,
        session: &Session,
        body: Self::CreateBody,
    ) -> Validation<Self::ValidatedCreateBody, Self::CreateErrors>;

    /// Persist a validated create payload.
    async fn create(
        &self,
        session: &Session,
        body: Self::ValidatedCreateBody,
    ) -> Result<Self::Entity, RepositoryError>;

    /// Lift the raw JSON body into the resource's update shape.
    fn parse_update_body(&self, body: &Value) -> Self::UpdateBody;

    /// Validate an update payload against the target id.
    async fn validate_update(
        &self,
        session: &Session,
        id: &str,
        body: Self::UpdateBody,
    ) -> Validation<Self::ValidatedUpdateBody, Self::UpdateErrors>;

    /// Persist a validated update payload.
    async fn update(
        &self,
        session: &Session,
        body: Self::ValidatedUpdateBody,
    ) -> Result<Self::Entity, RepositoryError>;

    /// Validate a delete target: permission first, then id resolution.
    async fn validate_delete(
        &self,
        session: &Session,
        id: &str,
    ) -> Validation<Self::ValidatedDeleteBody, Self::DeleteErrors>;

    /// Soft-deactivate the validated target.
    async fn delete(
        &self,
        session: &Session,
        body: Self::ValidatedDeleteBody,
    ) -> Result<Self::Entity, RepositoryError>;
}

/// Parse a request body as a JSON object, coercing anything else to `{}`.
///
/// Parsing never fails a request on its own; field validators report the
/// resulting empty fields with their own messages.
pub fn parse_json_object(payload: &[u8]) -> Value {
    serde_json::from_slice::<Value>(payload)
        .ok()
        .filter(Value::is_object)
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
}

/// Lift a string field, coercing absent or non-string values to `""`.
pub fn get_string(body: &Value, key: &str) -> String {
    body.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Lift an optional string field; absent or empty becomes `None`.
pub fn get_optional_string(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|raw| !raw.is_empty())
        .map(str::to_owned)
}

/// Lift a boolean field, coercing absent or non-boolean values to `false`.
pub fn get_bool(body: &Value, key: &str) -> bool {
    body.get(key).and_then(Value::as_bool).unwrap_or_default()
}

/// Lift an integer field; absent or non-numeric becomes `None`.
pub fn get_i64(body: &Value, key: &str) -> Option<i64> {
    body.get(key).and_then(Value::as_i64)
}

/// Lift a string-array field; non-arrays become empty, non-string items
/// coerce to `""` so per-item validation can report them.
pub fn get_string_array(body: &Value, key: &str) -> Vec<String> {
    body.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| item.as_str().unwrap_or_default().to_owned())
                .collect()
        })
        .unwrap_or_default()
}

fn permissions_error_body() -> Value {
    json!({ "permissions": [permissions::ERROR_MESSAGE] })
}

fn database_error_response(error: &RepositoryError) -> HttpResponse {
    tracing::error!(error = %error, "store operation failed");
    HttpResponse::ServiceUnavailable().json(json!({ "database": [ports::ERROR_MESSAGE] }))
}

struct ResourceState<R> {
    resource: R,
    sessions: SessionResolver,
}

async fn read_many_handler<R: CrudResource>(
    state: web::Data<ResourceState<R>>,
    ctx: SessionContext,
) -> HttpResponse {
    let session = state.sessions.resolve(&ctx).await;
    match state.resource.read_many(&session).await {
        Ok(listed) => HttpResponse::Ok().json(listed),
        Err(error) => database_error_response(&error),
    }
}

async fn read_one_handler<R: CrudResource>(
    state: web::Data<ResourceState<R>>,
    ctx: SessionContext,
    id: web::Path<String>,
) -> HttpResponse {
    let session = state.sessions.resolve(&ctx).await;
    match state.resource.read_one(&session, id.as_str()).await {
        Ok(entity) => HttpResponse::Ok().json(entity),
        Err(ReadOneError::InvalidId(messages)) => {
            HttpResponse::BadRequest().json(json!({ "id": messages }))
        }
        Err(ReadOneError::Unauthorized) => {
            HttpResponse::Unauthorized().json(permissions_error_body())
        }
        Err(ReadOneError::NotFound(messages)) => {
            HttpResponse::NotFound().json(json!({ "notFound": messages }))
        }
        Err(ReadOneError::Database) => {
            HttpResponse::ServiceUnavailable().json(json!({ "database": [ports::ERROR_MESSAGE] }))
        }
    }
}

async fn create_handler<R: CrudResource>(
    state: web::Data<ResourceState<R>>,
    ctx: SessionContext,
    payload: web::Bytes,
) -> HttpResponse {
    let session = state.sessions.resolve(&ctx).await;
    let raw = parse_json_object(&payload);
    let parsed = state.resource.parse_create_body(&raw);
    match state.resource.validate_create(&session, parsed).await {
        Validation::Valid(validated) => {
            if session.user.is_none() {
                return HttpResponse::Unauthorized().json(permissions_error_body());
            }
            match state.resource.create(&session, validated).await {
                Ok(entity) => HttpResponse::Created().json(entity),
                Err(error) => database_error_response(&error),
            }
        }
        Validation::Invalid(errors) => HttpResponse::BadRequest().json(errors),
    }
}

async fn update_handler<R: CrudResource>(
    state: web::Data<ResourceState<R>>,
    ctx: SessionContext,
    id: web::Path<String>,
    payload: web::Bytes,
) -> HttpResponse {
    let session = state.sessions.resolve(&ctx).await;
    let raw = parse_json_object(&payload);
    let parsed = state.resource.parse_update_body(&raw);
    match state
        .resource
        .validate_update(&session, id.as_str(), parsed)
        .await
    {
        Validation::Valid(validated) => match state.resource.update(&session, validated).await {
            Ok(entity) => HttpResponse::Ok().json(entity),
            Err(error) => database_error_response(&error),
        },
        Validation::Invalid(errors) => HttpResponse::BadRequest().json(errors),
    }
}

async fn delete_handler<R: CrudResource>(
    state: web::Data<ResourceState<R>>,
    ctx: SessionContext,
    id: web::Path<String>,
) -> HttpResponse {
    let session = state.sessions.resolve(&ctx).await;
    match state.resource.validate_delete(&session, id.as_str()).await {
        Validation::Valid(validated) => match state.resource.delete(&session, validated).await {
            Ok(entity) => HttpResponse::Ok().json(entity),
            Err(error) => database_error_response(&error),
        },
        Validation::Invalid(errors) => HttpResponse::BadRequest().json(errors),
    }
}

/// Register a resource's five operations under its namespace.
///
/// `PUT` and `PATCH` both route to update; the all-or-nothing validation
/// contract makes them equivalent at this surface.
pub fn scope<R: CrudResource>(resource: R, sessions: SessionResolver) -> Scope {
    let state = web::Data::new(ResourceState { resource, sessions });
    web::scope(&format!("/{}", R::NAMESPACE))
        .app_data(state)
        .route("", web::get().to(read_many_handler::<R>))
        .route("", web::post().to(create_handler::<R>))
        .route("/{id}", web::get().to(read_one_handler::<R>))
        .route("/{id}", web::put().to(update_handler::<R>))
        .route("/{id}", web::patch().to(update_handler::<R>))
        .route("/{id}", web::delete().to(delete_handler::<R>))
}
