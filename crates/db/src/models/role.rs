//! Role assignment rows.

use serde::Serialize;
use sqlx::FromRow;
use educ_core::types::DbId;

/// A row from the `user_roles` table, reduced to the fields the gate needs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserRoleRow {
    pub role: String,
    pub etablissement_id: Option<DbId>,
}
