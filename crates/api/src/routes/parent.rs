use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use super::attendance::JUSTIFICATION_BODY_LIMIT;
use crate::handlers::parent;
use crate::state::AppState;

/// Parent routes; every handler requires the `PARENT` role.
///
/// ```text
/// POST /parent-dashboard         -> dashboard
/// POST /parent-justify-absence   -> justify_absence (multipart)
/// GET  /parent-list-children     -> list_children
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/parent-dashboard", post(parent::dashboard))
        .route(
            "/parent-justify-absence",
            post(parent::justify_absence).layer(DefaultBodyLimit::max(JUSTIFICATION_BODY_LIMIT)),
        )
        .route("/parent-list-children", get(parent::list_children))
}
