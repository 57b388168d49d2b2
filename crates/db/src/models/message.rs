//! Thread and message models.

use serde::Serialize;
use sqlx::FromRow;
use educ_core::types::{DbId, Timestamp};

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub thread_id: DbId,
    pub author_id: DbId,
    pub content: String,
    pub read_by: Vec<DbId>,
    pub created_at: Timestamp,
}

/// A thread as listed for one participant.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ThreadSummary {
    pub id: DbId,
    pub subject: String,
    pub etablissement_id: Option<DbId>,
    pub updated_at: Timestamp,
    pub last_message_at: Option<Timestamp>,
    pub unread_count: i64,
}
