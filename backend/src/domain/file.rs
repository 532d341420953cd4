//! File records referenced by other entities (organization logos).
//!
//! Files are lookup-only at this surface: there is no REST resource for
//! them, only an existence check used while validating references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ports::FileRepository;
use super::validation::{Validation, invalid, valid};
use super::validators::validate_uuid;

/// A stored file's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Resolve a raw file id to its stored record.
///
/// The single awaited lookup makes this the async flavour of a field
/// validator; absence and malformed ids both surface as ordinary invalid
/// results, never as transport errors.
pub async fn validate_file_record(files: &dyn FileRepository, raw: &str) -> Validation<FileRecord> {
    let id = match validate_uuid(raw) {
        Validation::Valid(id) => id,
        Validation::Invalid(errors) => return invalid(errors),
    };
    match files.read_one(id).await {
        Ok(Some(record)) => valid(record),
        Ok(None) => invalid(vec!["The specified file was not found.".to_owned()]),
        Err(error) => {
            tracing::warn!(error = %error, "file record lookup failed");
            invalid(vec![
                "Unable to verify the specified file. Please try again later.".to_owned(),
            ])
        }
    }
}
