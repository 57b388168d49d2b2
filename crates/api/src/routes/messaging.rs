use axum::routing::{get, post};
use axum::Router;

use crate::handlers::messaging;
use crate::state::AppState;

/// ```text
/// GET  /threads-list       -> list_threads
/// POST /message-send       -> send_message
/// POST /thread-mark-read   -> mark_thread_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/threads-list", get(messaging::list_threads))
        .route("/message-send", post(messaging::send_message))
        .route("/thread-mark-read", post(messaging::mark_thread_read))
}
