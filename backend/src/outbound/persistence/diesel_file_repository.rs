//! PostgreSQL-backed `FileRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::file::FileRecord;
use crate::domain::ports::{FileRepository, RepositoryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{FileRow, NewFileRow};
use super::pool::DbPool;
use super::schema::files;

/// Diesel-backed implementation of the `FileRepository` port.
#[derive(Clone)]
pub struct DieselFileRepository {
    pool: DbPool,
}

impl DieselFileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: FileRow) -> FileRecord {
    FileRecord {
        id: row.id,
        name: row.name,
        created_at: row.created_at,
    }
}

#[async_trait]
impl FileRepository for DieselFileRepository {
    async fn read_one(&self, id: Uuid) -> Result<Option<FileRecord>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<FileRow> = files::table
            .filter(files::id.eq(id))
            .select(FileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_record))
    }

    async fn create(&self, name: &str) -> Result<FileRecord, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewFileRow {
            id: Uuid::new_v4(),
            name,
        };

        let row: FileRow = diesel::insert_into(files::table)
            .values(&new_row)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_record(row))
    }
}
