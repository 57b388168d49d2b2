//! Repository for the `threads`, `thread_participants` and `messages` tables.
//!
//! Read state lives in `messages.read_by`; unread counts are computed on
//! read.

use sqlx::PgPool;
use educ_core::types::DbId;

use crate::models::message::{Message, ThreadSummary};

const MESSAGE_COLUMNS: &str = "id, thread_id, author_id, content, read_by, created_at";

pub struct MessageRepo;

impl MessageRepo {
    pub async fn is_participant(
        pool: &PgPool,
        thread_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM thread_participants WHERE thread_id = $1 AND user_id = $2)",
        )
        .bind(thread_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Messages in the caller's threads, not written by the caller and not
    /// yet read by them.
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages m \
             JOIN thread_participants tp ON tp.thread_id = m.thread_id AND tp.user_id = $1 \
             WHERE m.author_id <> $1 AND NOT ($1 = ANY(m.read_by))",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Threads the user takes part in, most recently active first.
    pub async fn list_threads(pool: &PgPool, user_id: DbId) -> Result<Vec<ThreadSummary>, sqlx::Error> {
        sqlx::query_as::<_, ThreadSummary>(
            "SELECT t.id, t.subject, t.etablissement_id, t.updated_at, \
                    MAX(m.created_at) AS last_message_at, \
                    COUNT(m.id) FILTER (WHERE m.author_id <> $1 AND NOT ($1 = ANY(m.read_by))) \
                        AS unread_count \
             FROM threads t \
             JOIN thread_participants tp ON tp.thread_id = t.id AND tp.user_id = $1 \
             LEFT JOIN messages m ON m.thread_id = t.id \
             GROUP BY t.id \
             ORDER BY COALESCE(MAX(m.created_at), t.updated_at) DESC, t.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Append a message; its author has read it.
    pub async fn send(
        pool: &PgPool,
        thread_id: DbId,
        author_id: DbId,
        content: &str,
    ) -> Result<Message, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO messages (thread_id, author_id, content, read_by) \
             VALUES ($1, $2, $3, ARRAY[$2]::BIGINT[]) \
             RETURNING {MESSAGE_COLUMNS}"
        );
        let message = sqlx::query_as::<_, Message>(&query)
            .bind(thread_id)
            .bind(author_id)
            .bind(content)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE threads SET updated_at = now() WHERE id = $1")
            .bind(thread_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(message)
    }

    /// Add the user to the read-by set of every message of the thread.
    /// Returns the number of messages that changed.
    pub async fn mark_thread_read(
        pool: &PgPool,
        thread_id: DbId,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE messages SET read_by = array_append(read_by, $2) \
             WHERE thread_id = $1 AND NOT ($2 = ANY(read_by))",
        )
        .bind(thread_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Messages in threads of an establishment (all when unscoped).
    pub async fn count(pool: &PgPool, etablissement_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages m JOIN threads t ON t.id = m.thread_id \
             WHERE ($1::BIGINT IS NULL OR t.etablissement_id = $1)",
        )
        .bind(etablissement_id)
        .fetch_one(pool)
        .await
    }
}
