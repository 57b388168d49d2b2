//! Profile entity models.

use serde::Serialize;
use sqlx::FromRow;
use educ_core::types::{DbId, Timestamp};

/// A row from the `profiles` table.
///
/// `password_hash` is never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: DbId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A user as listed by the admin user directory, with aggregated roles.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserListEntry {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub roles: Vec<String>,
    pub created_at: Timestamp,
}
