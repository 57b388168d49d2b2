use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use educ_core::attendance::MAX_ATTACHMENT_BYTES;

use crate::handlers::attendance;
use crate::state::AppState;

/// Body limit for justification uploads: the attachment cap plus room for
/// the other form fields.
pub const JUSTIFICATION_BODY_LIMIT: usize = MAX_ATTACHMENT_BYTES + 256 * 1024;

/// ```text
/// POST /attendance-bulk-declare                  -> bulk_declare
/// POST /attendance-justify                       -> justify (multipart)
/// GET  /justifications/{attendance_id}/file      -> download_justification
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/attendance-bulk-declare", post(attendance::bulk_declare))
        .route(
            "/attendance-justify",
            post(attendance::justify).layer(DefaultBodyLimit::max(JUSTIFICATION_BODY_LIMIT)),
        )
        .route(
            "/justifications/{attendance_id}/file",
            get(attendance::download_justification),
        )
}
