//! Repository for the `analytics_events` table.

use sqlx::PgPool;
use educ_core::types::{DbId, Timestamp};

use crate::models::analytics_event::AnalyticsEvent;

const COLUMNS: &str = "id, event_type, actor_id, etablissement_id, payload, created_at";

pub struct AnalyticsEventRepo;

impl AnalyticsEventRepo {
    /// Insert one event, returning the generated id.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        actor_id: Option<DbId>,
        etablissement_id: Option<DbId>,
        payload: &serde_json::Value,
        created_at: Timestamp,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO analytics_events (event_type, actor_id, etablissement_id, payload, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(event_type)
        .bind(actor_id)
        .bind(etablissement_id)
        .bind(payload)
        .bind(created_at)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_type(
        pool: &PgPool,
        event_type: &str,
        limit: i64,
    ) -> Result<Vec<AnalyticsEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM analytics_events WHERE event_type = $1 \
             ORDER BY id DESC LIMIT $2"
        );
        sqlx::query_as::<_, AnalyticsEvent>(&query)
            .bind(event_type)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
