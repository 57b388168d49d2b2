pub mod admin;
pub mod ai;
pub mod attendance;
pub mod auth;
pub mod health;
pub mod messaging;
pub mod parent;
pub mod school;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Paths are flat, one per operation:
///
/// ```text
/// /auth/login                   login (public)
/// /auth/me                      current identity and roles
///
/// /admin-attendance-decide      decide a justification (admin)
/// /admin-dashboard              establishment dashboard, GET or POST (admin)
/// /admin-grades-lock-period     lock a grading period (admin)
/// /admin-users-list             list users (admin)
///
/// /ai-qcm-generate              generate a QCM (staff)
/// /ai-rag-query                 ask the library
///
/// /attendance-bulk-declare      declare a day of attendance (staff)
/// /attendance-justify           justify an absence (student or parent)
///
/// /export-schedule-ics          timetable as iCalendar
/// /generate-report-card         compute a report card
/// /grades-bulk-upsert           enter grades (staff)
/// /submission-grade             grade a submission (staff)
/// /teacher-dashboard            teacher dashboard (teacher)
///
/// /parent-dashboard             per-child dashboard (parent)
/// /parent-justify-absence       justify a child's absence (parent)
/// /parent-list-children         children of the caller (parent)
///
/// /threads-list                 threads with unread counts
/// /message-send                 post a message
/// /thread-mark-read             mark a thread read
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(admin::router())
        .merge(ai::router())
        .merge(attendance::router())
        .merge(school::router())
        .merge(parent::router())
        .merge(messaging::router())
}
