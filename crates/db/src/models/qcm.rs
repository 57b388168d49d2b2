//! Generated questionnaire sets.

use serde::Serialize;
use sqlx::FromRow;
use educ_core::types::{DbId, Timestamp};

/// A row from the `qcm_sets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QcmSet {
    pub id: DbId,
    pub etablissement_id: Option<DbId>,
    pub subject: String,
    pub grade: String,
    pub theme: String,
    pub items: serde_json::Value,
    pub scoring: serde_json::Value,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// Input for persisting a generated set.
#[derive(Debug, Clone)]
pub struct CreateQcmSet {
    pub etablissement_id: Option<DbId>,
    pub subject: String,
    pub grade: String,
    pub theme: String,
    pub items: serde_json::Value,
    pub scoring: serde_json::Value,
    pub created_by: DbId,
}
