//! Driven port for file-record lookups, with an in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::file::FileRecord;

/// Persistence operations for file records.
///
/// Only lookup and registration: file content lives elsewhere, this surface
/// just needs to confirm a reference points at something real.
#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn read_one(&self, id: Uuid) -> Result<Option<FileRecord>, RepositoryError>;
    async fn create(&self, name: &str) -> Result<FileRecord, RepositoryError>;
}

/// In-memory file store used by tests and the database-less dev server.
#[derive(Debug, Default)]
pub struct InMemoryFileRepository {
    rows: Mutex<HashMap<Uuid, FileRecord>>,
}

impl InMemoryFileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, FileRecord>>, RepositoryError> {
        self.rows
            .lock()
            .map_err(|_| RepositoryError::connection("file store lock poisoned"))
    }
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn read_one(&self, id: Uuid) -> Result<Option<FileRecord>, RepositoryError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn create(&self, name: &str) -> Result<FileRecord, RepositoryError> {
        let record = FileRecord {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            created_at: Utc::now(),
        };
        self.lock()?.insert(record.id, record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_records_resolve_and_unknown_ids_do_not() {
        let repo = InMemoryFileRepository::new();
        let record = repo.create("logo.png").await.expect("create");
        assert_eq!(
            repo.read_one(record.id).await.expect("read").map(|r| r.name),
            Some("logo.png".to_owned())
        );
        assert!(repo.read_one(Uuid::new_v4()).await.expect("read").is_none());
    }
}
