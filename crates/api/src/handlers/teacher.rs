//! Teacher dashboard.

use axum::extract::State;
use axum::Json;
use educ_db::models::grade::ClassAverage;
use educ_db::models::schedule::ScheduleEntry;
use educ_db::repositories::{
    AttendanceRepo, ClassRepo, GradeRepo, MessageRepo, ScheduleRepo, SubmissionRepo,
};
use serde::Serialize;

use crate::dashboard::{self, or_default};
use crate::error::AppResult;
use crate::middleware::rbac::RequireTeacher;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDashboard {
    pub today_schedule: Vec<ScheduleEntry>,
    /// Submissions of the teacher's assignments not graded yet.
    pub pending_grading: i64,
    pub unread_messages: i64,
    /// Over the teacher's classes, last 30 days.
    pub attendance_rate: f64,
    pub class_averages: Vec<ClassAverage>,
}

/// POST /api/v1/teacher-dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    RequireTeacher(teacher): RequireTeacher,
) -> AppResult<Json<TeacherDashboard>> {
    let pool = &state.pool;
    let today = dashboard::today();
    let since = dashboard::window_start(today);
    let weekday = dashboard::iso_weekday(today);

    let classe_ids =
        or_default("teacher_classes", ClassRepo::list_for_teacher(pool, teacher.user_id)).await;

    let (today_schedule, pending_grading, unread_messages, attendance_rate, class_averages) =
        tokio::join!(
            or_default(
                "today_schedule",
                ScheduleRepo::list_for_teacher(pool, teacher.user_id, Some(weekday)),
            ),
            or_default(
                "pending_grading",
                SubmissionRepo::count_pending_for_teacher(pool, teacher.user_id),
            ),
            or_default("unread_messages", MessageRepo::unread_count(pool, teacher.user_id)),
            dashboard::attendance_rate(
                "attendance_rate",
                AttendanceRepo::counts_for_classes_since(pool, &classe_ids, since),
            ),
            or_default(
                "class_averages",
                GradeRepo::class_averages_for_teacher(pool, teacher.user_id),
            ),
        );

    Ok(Json(TeacherDashboard {
        today_schedule,
        pending_grading,
        unread_messages,
        attendance_rate,
        class_averages,
    }))
}
