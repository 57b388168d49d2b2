//! Best-effort audit sink.

use educ_core::audit::NewAuditEntry;
use educ_db::repositories::AuditLogRepo;
use educ_db::DbPool;

/// Write an audit entry for a mutation that has already been committed.
///
/// A failure is logged and swallowed: the mutation stands either way.
pub async fn record(pool: &DbPool, entry: NewAuditEntry) {
    if let Err(e) = AuditLogRepo::insert(pool, &entry).await {
        tracing::error!(
            error = %e,
            action = entry.action,
            entity_type = entry.entity_type,
            entity_id = ?entry.entity_id,
            actor_id = entry.actor_id,
            "Failed to write audit entry",
        );
    }
}
