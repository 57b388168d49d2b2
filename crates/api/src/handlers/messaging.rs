//! Message threads between staff, parents and students.

use axum::extract::State;
use axum::Json;
use educ_core::error::CoreError;
use educ_core::types::DbId;
use educ_db::models::message::{Message, ThreadSummary};
use educ_db::repositories::MessageRepo;
use educ_db::DbPool;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::extract::ValidJson;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, SuccessResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub thread_id: DbId,
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MarkReadRequest {
    pub thread_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct MarkReadPayload {
    /// Messages newly marked as read.
    pub updated: u64,
}

async fn ensure_participant(pool: &DbPool, thread_id: DbId, user_id: DbId) -> AppResult<()> {
    if MessageRepo::is_participant(pool, thread_id, user_id).await? {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!("Not a participant of thread {thread_id}")).into())
    }
}

/// GET /api/v1/threads-list
///
/// Threads the caller participates in, most recently active first, each
/// with its unread count.
pub async fn list_threads(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ThreadSummary>>>> {
    let threads = MessageRepo::list_threads(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: threads }))
}

/// POST /api/v1/message-send
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(input): ValidJson<SendMessageRequest>,
) -> AppResult<Json<DataResponse<Message>>> {
    let content = input.content.trim();
    if content.is_empty() {
        return Err(CoreError::Validation("content must not be blank".into()).into());
    }

    ensure_participant(&state.pool, input.thread_id, user.user_id).await?;

    let message = MessageRepo::send(&state.pool, input.thread_id, user.user_id, content).await?;
    tracing::debug!(
        thread_id = input.thread_id,
        message_id = message.id,
        author_id = user.user_id,
        "Message sent",
    );

    Ok(Json(DataResponse { data: message }))
}

/// POST /api/v1/thread-mark-read
pub async fn mark_thread_read(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(input): ValidJson<MarkReadRequest>,
) -> AppResult<Json<SuccessResponse<MarkReadPayload>>> {
    ensure_participant(&state.pool, input.thread_id, user.user_id).await?;

    let updated = MessageRepo::mark_thread_read(&state.pool, input.thread_id, user.user_id).await?;

    Ok(Json(SuccessResponse::new(MarkReadPayload { updated })))
}
