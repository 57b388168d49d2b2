//! Parent endpoints: children, per-child dashboard, absence justification.

use axum::extract::{Multipart, State};
use axum::Json;
use educ_core::error::CoreError;
use educ_core::grading::{general_average, subject_averages};
use educ_core::types::DbId;
use educ_db::models::attendance::Attendance;
use educ_db::models::grade::GradeWithSubject;
use educ_db::models::schedule::ScheduleEntry;
use educ_db::models::school::ChildSummary;
use educ_db::repositories::{
    AttendanceRepo, GradeRepo, MatiereRepo, MessageRepo, RelationshipRepo, ScheduleRepo,
    StudentRepo,
};
use educ_db::DbPool;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dashboard::{self, or_default, or_fallback};
use crate::error::AppResult;
use crate::extract::ValidJson;
use crate::handlers::attendance::{submit_justification, Justifier};
use crate::middleware::rbac::RequireParent;
use crate::response::DataResponse;
use crate::state::AppState;

/// Grades shown on the parent dashboard.
const RECENT_GRADES_LIMIT: i64 = 5;

#[derive(Debug, Deserialize, Validate)]
pub struct ParentDashboardRequest {
    pub child_id: DbId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentDashboard {
    pub child: ChildSummary,
    pub attendance_rate: f64,
    pub recent_grades: Vec<GradeWithSubject>,
    /// Over every validated grade of the child.
    pub general_average: Option<f64>,
    pub pending_justifications: i64,
    pub unread_messages: i64,
    pub today_schedule: Vec<ScheduleEntry>,
}

#[derive(Debug, Serialize)]
pub struct ChildrenResponse {
    pub children: Vec<ChildSummary>,
}

/// GET /api/v1/parent-list-children
pub async fn list_children(
    State(state): State<AppState>,
    RequireParent(parent): RequireParent,
) -> AppResult<Json<ChildrenResponse>> {
    let children = StudentRepo::list_children(&state.pool, parent.user_id).await?;
    Ok(Json(ChildrenResponse { children }))
}

/// POST /api/v1/parent-dashboard
///
/// The parent-of relationship is checked first and is fatal; the
/// sub-queries after it degrade to defaults.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireParent(parent): RequireParent,
    ValidJson(input): ValidJson<ParentDashboardRequest>,
) -> AppResult<Json<ParentDashboard>> {
    let pool = &state.pool;

    if !RelationshipRepo::is_parent_of(pool, parent.user_id, input.child_id).await? {
        return Err(CoreError::Forbidden(format!(
            "Student {} is not one of your children",
            input.child_id
        ))
        .into());
    }

    let child = StudentRepo::child_summary(pool, input.child_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Student",
            id: input.child_id,
        })?;

    let today = dashboard::today();
    let since = dashboard::window_start(today);
    let weekday = dashboard::iso_weekday(today);

    let (
        attendance_rate,
        recent_grades,
        general_average,
        pending_justifications,
        unread_messages,
        today_schedule,
    ) = tokio::join!(
        dashboard::attendance_rate(
            "attendance_rate",
            AttendanceRepo::counts_for_student_since(pool, child.student_id, since),
        ),
        or_default(
            "recent_grades",
            GradeRepo::recent_for_student(pool, child.student_id, RECENT_GRADES_LIMIT),
        ),
        or_fallback(
            "general_average",
            None,
            child_general_average(pool, child.student_id, child.etablissement_id),
        ),
        or_default(
            "pending_justifications",
            AttendanceRepo::count_pending_for_student(pool, child.student_id),
        ),
        or_default("unread_messages", MessageRepo::unread_count(pool, parent.user_id)),
        or_default("today_schedule", async {
            match child.classe_id {
                Some(classe_id) => {
                    ScheduleRepo::list_for_class(pool, classe_id, Some(weekday)).await
                }
                None => Ok(Vec::new()),
            }
        }),
    );

    Ok(Json(ParentDashboard {
        child,
        attendance_rate,
        recent_grades,
        general_average,
        pending_justifications,
        unread_messages,
        today_schedule,
    }))
}

async fn child_general_average(
    pool: &DbPool,
    student_id: DbId,
    etablissement_id: DbId,
) -> Result<Option<f64>, sqlx::Error> {
    let grades = GradeRepo::validated_for_student(pool, student_id, None).await?;
    let coefficients = MatiereRepo::coefficients(pool, etablissement_id).await?;
    Ok(general_average(&subject_averages(&grades, &coefficients)))
}

/// POST /api/v1/parent-justify-absence
///
/// Same multipart form as `attendance-justify`, restricted to parents of
/// the student concerned.
pub async fn justify_absence(
    State(state): State<AppState>,
    RequireParent(parent): RequireParent,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<Attendance>>> {
    submit_justification(&state, &parent, multipart, Justifier::ParentOnly)
        .await
        .map(|data| Json(DataResponse { data }))
}
