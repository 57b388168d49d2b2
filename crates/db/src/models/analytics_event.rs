//! Persisted usage analytics events.

use serde::Serialize;
use sqlx::FromRow;
use educ_core::types::{DbId, Timestamp};

/// A row from the `analytics_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnalyticsEvent {
    pub id: DbId,
    pub event_type: String,
    pub actor_id: Option<DbId>,
    pub etablissement_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}
