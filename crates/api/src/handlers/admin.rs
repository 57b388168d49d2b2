//! Administrator endpoints: justification decisions, establishment
//! dashboard, period locking and user listing.
//!
//! Every handler requires `SCHOOL_ADMIN` or `SYSTEM_ADMIN` and then scopes
//! the target establishment through [`educ_core::access`].

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use educ_core::access::{authorize, resolve_scope, Scope};
use educ_core::attendance::{ensure_justifiable, parse_decision_literal, AttendanceStatus};
use educ_core::audit::{
    NewAuditEntry, ACTION_ATTENDANCE_DECISION, ACTION_GRADES_PERIOD_LOCK, ENTITY_ATTENDANCE,
    ENTITY_GRADING_PERIOD,
};
use educ_core::error::CoreError;
use educ_core::grading::validate_period;
use educ_core::roles::Role;
use educ_core::types::DbId;
use educ_db::models::attendance::Attendance;
use educ_db::models::profile::UserListEntry;
use educ_db::repositories::{
    AttendanceRepo, DashboardRepo, GradeRepo, MessageRepo, ProfileRepo, ReportCardRepo,
};
use educ_events::bus::{ATTENDANCE_DECIDED, GRADES_PERIOD_LOCKED};
use educ_events::UsageEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::audit;
use crate::dashboard::{self, or_default};
use crate::error::{AppError, AppResult};
use crate::extract::{optional_json, ValidJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, ADMIN_ROLES};
use crate::response::SuccessResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct DecideAttendanceRequest {
    pub attendance_id: DbId,
    /// Wire literal, `VALIDE` or `REFUSE`.
    pub decision: String,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AttendancePayload {
    pub attendance: Attendance,
}

/// Optional establishment selector, as query string or JSON body.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EstablishmentScope {
    #[validate(range(min = 1))]
    pub etablissement_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub students_count: i64,
    pub classes_count: i64,
    pub teachers_count: i64,
    /// Percentage over the last 30 days.
    pub attendance_rate: f64,
    pub grades_count: i64,
    pub published_reports: i64,
    pub messages_count: i64,
    pub pending_justifications: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LockPeriodRequest {
    pub etablissement_id: DbId,
    #[validate(length(min = 1, max = 16))]
    pub period: String,
}

#[derive(Debug, Serialize)]
pub struct MessagePayload {
    pub message: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListUsersRequest {
    pub role: Option<String>,
    #[validate(range(min = 1))]
    pub etablissement_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserListEntry>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin-attendance-decide
///
/// Approve (`VALIDE`) or reject (`REFUSE`) a justification. Any other
/// decision literal is rejected before anything is read or written.
pub async fn decide_attendance(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidJson(input): ValidJson<DecideAttendanceRequest>,
) -> AppResult<Json<SuccessResponse<AttendancePayload>>> {
    let decision = parse_decision_literal(&input.decision)?;

    let before = AttendanceRepo::find_by_id(&state.pool, input.attendance_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Attendance",
            id: input.attendance_id,
        })?;

    authorize(&admin.principal, ADMIN_ROLES, Some(before.etablissement_id))?;

    let status: AttendanceStatus = before
        .status
        .parse()
        .map_err(|e: String| AppError::InternalError(e))?;
    ensure_justifiable(status)?;

    let note = input.note.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let after = AttendanceRepo::decide(&state.pool, before.id, decision, note, admin.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Attendance",
            id: before.id,
        })?;

    tracing::info!(
        attendance_id = after.id,
        decision = decision.as_str(),
        validated_by = admin.user_id,
        "Attendance justification decided",
    );

    audit::record(
        &state.pool,
        NewAuditEntry {
            actor_id: admin.user_id,
            action: ACTION_ATTENDANCE_DECISION,
            entity_type: ENTITY_ATTENDANCE,
            entity_id: Some(after.id),
            etablissement_id: Some(after.etablissement_id),
            before: Some(json!(before)),
            after: Some(json!(after)),
        },
    )
    .await;

    state.event_bus.publish(
        UsageEvent::new(ATTENDANCE_DECIDED)
            .with_actor(admin.user_id)
            .with_etablissement(Some(after.etablissement_id))
            .with_payload(json!({
                "attendance_id": after.id,
                "decision": decision.as_str(),
            })),
    );

    Ok(Json(SuccessResponse::new(AttendancePayload {
        attendance: after,
    })))
}

/// GET /api/v1/admin-dashboard?etablissement_id=
pub async fn dashboard_get(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(scope): Query<EstablishmentScope>,
) -> AppResult<Json<AdminDashboard>> {
    admin_dashboard(&state, &admin, scope).await.map(Json)
}

/// POST /api/v1/admin-dashboard
///
/// Same as the `GET` form; the optional body carries `etablissement_id`.
pub async fn dashboard_post(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    body: Bytes,
) -> AppResult<Json<AdminDashboard>> {
    let scope: EstablishmentScope = optional_json(&body)?;
    admin_dashboard(&state, &admin, scope).await.map(Json)
}

async fn admin_dashboard(
    state: &AppState,
    admin: &AuthUser,
    scope: EstablishmentScope,
) -> AppResult<AdminDashboard> {
    let scope = resolve_scope(&admin.principal, ADMIN_ROLES, scope.etablissement_id)?;
    let etab = scope.etablissement_id();
    let pool = &state.pool;
    let since = dashboard::window_start(dashboard::today());

    let (
        students_count,
        classes_count,
        teachers_count,
        attendance_rate,
        grades_count,
        published_reports,
        messages_count,
        pending_justifications,
    ) = tokio::join!(
        or_default("students_count", DashboardRepo::count_students(pool, etab)),
        or_default("classes_count", DashboardRepo::count_classes(pool, etab)),
        or_default("teachers_count", DashboardRepo::count_teachers(pool, etab)),
        dashboard::attendance_rate("attendance_rate", AttendanceRepo::counts_since(pool, etab, since)),
        or_default("grades_count", GradeRepo::count(pool, etab)),
        or_default("published_reports", ReportCardRepo::count_published(pool, etab)),
        or_default("messages_count", MessageRepo::count(pool, etab)),
        or_default("pending_justifications", AttendanceRepo::count_pending(pool, etab)),
    );

    tracing::debug!(
        user_id = admin.user_id,
        scope = ?scope,
        "Admin dashboard computed",
    );

    Ok(AdminDashboard {
        students_count,
        classes_count,
        teachers_count,
        attendance_rate,
        grades_count,
        published_reports,
        messages_count,
        pending_justifications,
    })
}

/// POST /api/v1/admin-grades-lock-period
///
/// Lock a grading period for an establishment and validate its grades.
/// Locking an already locked period is allowed and re-validates.
pub async fn lock_period(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidJson(input): ValidJson<LockPeriodRequest>,
) -> AppResult<Json<SuccessResponse<MessagePayload>>> {
    validate_period(&input.period)?;
    authorize(&admin.principal, ADMIN_ROLES, Some(input.etablissement_id))?;

    let outcome =
        GradeRepo::lock_period(&state.pool, input.etablissement_id, &input.period, admin.user_id)
            .await?;

    tracing::info!(
        etablissement_id = input.etablissement_id,
        period = %input.period,
        grades_validated = outcome.grades_validated,
        was_locked = outcome.was_locked,
        "Grading period locked",
    );

    audit::record(
        &state.pool,
        NewAuditEntry {
            actor_id: admin.user_id,
            action: ACTION_GRADES_PERIOD_LOCK,
            entity_type: ENTITY_GRADING_PERIOD,
            entity_id: Some(outcome.period.id),
            etablissement_id: Some(input.etablissement_id),
            before: Some(json!({ "locked": outcome.was_locked })),
            after: Some(json!({
                "locked": true,
                "grades_validated": outcome.grades_validated,
            })),
        },
    )
    .await;

    state.event_bus.publish(
        UsageEvent::new(GRADES_PERIOD_LOCKED)
            .with_actor(admin.user_id)
            .with_etablissement(Some(input.etablissement_id))
            .with_payload(json!({
                "period": input.period,
                "grades_validated": outcome.grades_validated,
            })),
    );

    Ok(Json(SuccessResponse::new(MessagePayload {
        message: format!(
            "Period {} locked; {} grade(s) validated",
            input.period, outcome.grades_validated
        ),
    })))
}

/// POST /api/v1/admin-users-list
///
/// Users of the resolved establishment (all users for a system
/// administrator naming none), optionally filtered by role.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    body: Bytes,
) -> AppResult<Json<UsersResponse>> {
    let input: ListUsersRequest = optional_json(&body)?;

    let role = input
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(CoreError::Validation)?;

    let scope = resolve_scope(&admin.principal, ADMIN_ROLES, input.etablissement_id)?;
    if scope == Scope::Global {
        tracing::debug!(user_id = admin.user_id, "Listing users across all establishments");
    }

    let users = ProfileRepo::list_users(
        &state.pool,
        scope.etablissement_id(),
        role.map(Role::as_str),
    )
    .await?;

    Ok(Json(UsersResponse { users }))
}
