//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::permissions;
use crate::domain::ports::{RepositoryError, UserRepository, UserUpdate};
use crate::domain::session::Session;
use crate::domain::user::{User, UserType, ValidatedUserBody};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserChanges, UserDeactivation, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn user_type_to_str(user_type: UserType) -> &'static str {
    match user_type {
        UserType::Admin => "ADMIN",
        UserType::Gov => "GOV",
        UserType::Vendor => "VENDOR",
    }
}

pub(crate) fn user_type_from_str(raw: &str, id: Uuid) -> UserType {
    match raw {
        "ADMIN" => UserType::Admin,
        "GOV" => UserType::Gov,
        "VENDOR" => UserType::Vendor,
        other => {
            tracing::warn!(value = other, user = %id, "unrecognised user type, defaulting to VENDOR");
            UserType::Vendor
        }
    }
}

pub(crate) fn row_to_user(row: UserRow) -> User {
    let user_type = user_type_from_str(row.user_type.as_str(), row.id);
    User {
        id: row.id,
        user_type,
        name: row.name,
        email: row.email,
        job_title: row.job_title,
        active: row.active,
        deactivated_on: row.deactivated_on,
        deactivated_by: row.deactivated_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn read_many(&self, session: &Session) -> Result<Vec<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = if permissions::is_admin(session) {
            users::table
                .order(users::name.asc())
                .select(UserRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?
        } else if let Some(id) = session.user_id() {
            users::table
                .filter(users::id.eq(id))
                .select(UserRow::as_select())
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?
        } else {
            Vec::new()
        };

        Ok(rows.into_iter().map(row_to_user).collect())
    }

    async fn read_one(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_user))
    }

    async fn create(&self, body: ValidatedUserBody) -> Result<User, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            user_type: user_type_to_str(body.user_type),
            name: &body.name,
            email: &body.email,
            job_title: body.job_title.as_deref(),
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        tracing::info!(user = %row.id, "user created");
        Ok(row_to_user(row))
    }

    async fn update(&self, update: UserUpdate) -> Result<User, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        if let Some(fields) = &update.fields {
            let changes = UserChanges {
                user_type: user_type_to_str(fields.user_type),
                name: &fields.name,
                email: &fields.email,
                job_title: fields.job_title.as_deref(),
                updated_at: Utc::now(),
            };
            diesel::update(users::table.filter(users::id.eq(update.id)))
                .set(&changes)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            tracing::info!(user = %update.id, "user updated");
        }

        if let Some(deactivation) = update.deactivation {
            // Only the first deactivation writes a stamp.
            diesel::update(
                users::table.filter(users::id.eq(update.id).and(users::active.eq(true))),
            )
            .set(&UserDeactivation {
                active: false,
                deactivated_on: deactivation.on,
                deactivated_by: deactivation.by,
                updated_at: Utc::now(),
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        }

        let row: UserRow = users::table
            .filter(users::id.eq(update.id))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_user(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ADMIN", UserType::Admin)]
    #[case("GOV", UserType::Gov)]
    #[case("VENDOR", UserType::Vendor)]
    #[case("SOMETHING_ELSE", UserType::Vendor)]
    fn user_type_round_trips_with_restrictive_default(
        #[case] raw: &str,
        #[case] expected: UserType,
    ) {
        assert_eq!(user_type_from_str(raw, Uuid::nil()), expected);
    }

    #[rstest]
    fn row_conversion_preserves_lifecycle_fields() {
        let now = Utc::now();
        let row = UserRow {
            id: Uuid::new_v4(),
            user_type: "GOV".to_owned(),
            name: "Casey".to_owned(),
            email: "casey@example.gov".to_owned(),
            job_title: Some("Buyer".to_owned()),
            active: false,
            deactivated_on: Some(now),
            deactivated_by: Some(Uuid::nil()),
            created_at: now,
            updated_at: now,
        };
        let user = row_to_user(row);
        assert_eq!(user.user_type, UserType::Gov);
        assert!(!user.active);
        assert_eq!(user.deactivated_on, Some(now));
    }
}
