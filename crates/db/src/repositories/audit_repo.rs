//! Repository for the append-only `audit_logs` table.

use sqlx::PgPool;
use educ_core::audit::NewAuditEntry;
use educ_core::types::DbId;

use crate::models::audit::AuditLog;

const COLUMNS: &str = "\
    id, actor_id, action, entity_type, entity_id, etablissement_id, \
    before_json, after_json, created_at";

pub struct AuditLogRepo;

impl AuditLogRepo {
    pub async fn insert(pool: &PgPool, entry: &NewAuditEntry) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs \
                (actor_id, action, entity_type, entity_id, etablissement_id, before_json, after_json) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(entry.actor_id)
            .bind(entry.action)
            .bind(entry.entity_type)
            .bind(entry.entity_id)
            .bind(entry.etablissement_id)
            .bind(&entry.before)
            .bind(&entry.after)
            .fetch_one(pool)
            .await
    }

    /// Entries for one entity, newest first.
    pub async fn list_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs \
             WHERE entity_type = $1 AND entity_id = $2 ORDER BY id DESC"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }
}
