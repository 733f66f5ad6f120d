//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wiki_core::types::{DbId, Timestamp};
use wiki_core::zone_links::LinkUser;

/// Full user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    /// One of [`wiki_core::roles::VALID_ROLES`].
    pub role: String,
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Privileges as seen by the zone link helpers.
    pub fn as_link_user(&self) -> LinkUser<'_> {
        LinkUser {
            role: &self.role,
            is_superuser: self.is_superuser,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    /// Defaults to `reader`.
    pub role: Option<String>,
    pub is_superuser: Option<bool>,
}
