//! Request session.
//!
//! One session per request surface: materialised from the session cookie by
//! the HTTP adapter and passed explicitly to every operation. Never mutated
//! across requests.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::User;

/// The caller's context: an optional authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The authenticated user, when the session cookie resolves to one.
    pub user: Option<User>,
}

impl Session {
    /// A session with no authenticated user.
    pub const fn anonymous() -> Self {
        Self { user: None }
    }

    /// A session carrying an authenticated user.
    pub const fn authenticated(user: User) -> Self {
        Self { user: Some(user) }
    }

    /// The acting user's id, if any.
    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|user| user.id)
    }
}
