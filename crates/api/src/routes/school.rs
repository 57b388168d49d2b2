use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{grades, report_card, schedule, submission, teacher};
use crate::state::AppState;

/// Teaching routes: grades, report cards, timetable, teacher dashboard.
///
/// ```text
/// GET  /export-schedule-ics    -> schedule::export_ics
/// POST /generate-report-card   -> report_card::generate
/// POST /grades-bulk-upsert     -> grades::bulk_upsert
/// POST /submission-grade       -> submission::grade
/// POST /teacher-dashboard      -> teacher::dashboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export-schedule-ics", get(schedule::export_ics))
        .route("/generate-report-card", post(report_card::generate))
        .route("/grades-bulk-upsert", post(grades::bulk_upsert))
        .route("/submission-grade", post(submission::grade))
        .route("/teacher-dashboard", post(teacher::dashboard))
}
