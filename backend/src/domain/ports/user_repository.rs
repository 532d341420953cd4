//! Driven port for user persistence, with an in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{Deactivation, RepositoryError};
use crate::domain::permissions;
use crate::domain::session::Session;
use crate::domain::user::{User, ValidatedUserBody};

/// Partial update applied to a stored user.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub id: Uuid,
    /// Replacement field values, when the update edits the record.
    pub fields: Option<ValidatedUserBody>,
    /// Soft-deactivation stamp, when the update retires the record.
    pub deactivation: Option<Deactivation>,
}

/// Persistence operations for users.
///
/// `read_many` filters by session: admins list everyone, other signed-in
/// users list only themselves, anonymous callers list nothing.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn read_many(&self, session: &Session) -> Result<Vec<User>, RepositoryError>;
    async fn read_one(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    async fn create(&self, body: ValidatedUserBody) -> Result<User, RepositoryError>;
    async fn update(&self, update: UserUpdate) -> Result<User, RepositoryError>;
}

/// In-memory user store used by tests and the database-less dev server.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed user, returning its id. Fixture/seed use only.
    pub fn seed(&self, user: User) -> Uuid {
        let id = user.id;
        if let Ok(mut rows) = self.rows.lock() {
            rows.insert(id, user);
        }
        id
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, User>>, RepositoryError> {
        self.rows
            .lock()
            .map_err(|_| RepositoryError::connection("user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn read_many(&self, session: &Session) -> Result<Vec<User>, RepositoryError> {
        let rows = self.lock()?;
        let mut users: Vec<User> = if permissions::is_admin(session) {
            rows.values().cloned().collect()
        } else {
            session
                .user_id()
                .and_then(|id| rows.get(&id).cloned())
                .into_iter()
                .collect()
        };
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn read_one(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .lock()?
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, body: ValidatedUserBody) -> Result<User, RepositoryError> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            user_type: body.user_type,
            name: body.name,
            email: body.email,
            job_title: body.job_title,
            active: true,
            deactivated_on: None,
            deactivated_by: None,
            created_at: now,
            updated_at: now,
        };
        self.lock()?.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, update: UserUpdate) -> Result<User, RepositoryError> {
        let mut rows = self.lock()?;
        let user = rows
            .get_mut(&update.id)
            .ok_or_else(|| RepositoryError::query("user not found"))?;
        if let Some(fields) = update.fields {
            user.user_type = fields.user_type;
            user.name = fields.name;
            user.email = fields.email;
            user.job_title = fields.job_title;
        }
        if let Some(deactivation) = update.deactivation {
            // Repeat deactivations keep the original audit stamp.
            if user.active {
                user.active = false;
                user.deactivated_on = Some(deactivation.on);
                user.deactivated_by = Some(deactivation.by);
            }
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserType;
    use rstest::rstest;

    fn body(name: &str, email: &str, user_type: UserType) -> ValidatedUserBody {
        ValidatedUserBody {
            user_type,
            name: name.to_owned(),
            email: email.to_owned(),
            job_title: None,
        }
    }

    #[tokio::test]
    async fn read_many_redacts_by_session() {
        let repo = InMemoryUserRepository::new();
        let admin = repo
            .create(body("Admin", "admin@example.com", UserType::Admin))
            .await
            .expect("create admin");
        let vendor = repo
            .create(body("Vendor", "vendor@example.com", UserType::Vendor))
            .await
            .expect("create vendor");

        let all = repo
            .read_many(&Session::authenticated(admin))
            .await
            .expect("admin listing");
        assert_eq!(all.len(), 2);

        let own = repo
            .read_many(&Session::authenticated(vendor.clone()))
            .await
            .expect("vendor listing");
        assert_eq!(own, vec![vendor]);

        let none = repo
            .read_many(&Session::anonymous())
            .await
            .expect("anonymous listing");
        assert!(none.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn deactivation_stamp_survives_repeat_deletes() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(body("Vendor", "vendor@example.com", UserType::Vendor))
            .await
            .expect("create");
        let actor = Uuid::new_v4();
        let first_stamp = Utc::now();
        let deactivated = repo
            .update(UserUpdate {
                id: user.id,
                fields: None,
                deactivation: Some(Deactivation {
                    on: first_stamp,
                    by: actor,
                }),
            })
            .await
            .expect("deactivate");
        assert!(!deactivated.active);

        let again = repo
            .update(UserUpdate {
                id: user.id,
                fields: None,
                deactivation: Some(Deactivation {
                    on: Utc::now(),
                    by: Uuid::new_v4(),
                }),
            })
            .await
            .expect("repeat deactivate");
        assert_eq!(again.deactivated_on, Some(first_stamp));
        assert_eq!(again.deactivated_by, Some(actor));
    }
}
