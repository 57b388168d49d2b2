//! Audit log entity. Immutable once written (no `updated_at`).

use serde::Serialize;
use sqlx::FromRow;
use educ_core::types::{DbId, Timestamp};

/// A row from the `audit_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub actor_id: Option<DbId>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub etablissement_id: Option<DbId>,
    pub before_json: Option<serde_json::Value>,
    pub after_json: Option<serde_json::Value>,
    pub created_at: Timestamp,
}
