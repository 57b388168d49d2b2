use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Administrator routes. Role and establishment checks are enforced by the
/// handler extractors.
///
/// ```text
/// POST     /admin-attendance-decide    -> decide_attendance
/// GET|POST /admin-dashboard            -> dashboard_get, dashboard_post
/// POST     /admin-grades-lock-period   -> lock_period
/// POST     /admin-users-list           -> list_users
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin-attendance-decide", post(admin::decide_attendance))
        .route(
            "/admin-dashboard",
            get(admin::dashboard_get).post(admin::dashboard_post),
        )
        .route("/admin-grades-lock-period", post(admin::lock_period))
        .route("/admin-users-list", post(admin::list_users))
}
