//! Grading of homework submissions.

use axum::extract::State;
use axum::Json;
use educ_core::audit::{NewAuditEntry, ACTION_SUBMISSION_GRADE, ENTITY_SUBMISSION};
use educ_core::error::CoreError;
use educ_core::roles::Role;
use educ_core::types::DbId;
use educ_db::models::submission::Submission;
use educ_db::repositories::{RelationshipRepo, SubmissionRepo};
use educ_events::bus::SUBMISSION_GRADED;
use educ_events::UsageEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::access::administers;
use crate::audit;
use crate::error::AppResult;
use crate::extract::ValidJson;
use crate::middleware::rbac::RequireStaff;
use crate::response::SuccessResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct GradeSubmissionRequest {
    pub submission_id: DbId,
    #[validate(range(min = 0.0, max = 20.0))]
    pub note: f64,
    #[validate(length(max = 2000))]
    pub commentaire: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionPayload {
    pub submission: Submission,
}

/// POST /api/v1/submission-grade
///
/// Allowed for the assignment's author, a teacher assigned to the
/// assignment's class and subject, or an administrator of its establishment.
pub async fn grade(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    ValidJson(input): ValidJson<GradeSubmissionRequest>,
) -> AppResult<Json<SuccessResponse<SubmissionPayload>>> {
    let ctx = SubmissionRepo::find_context(&state.pool, input.submission_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Submission",
            id: input.submission_id,
        })?;

    let allowed = administers(&user.principal, ctx.etablissement_id)
        || (user.principal.has_role_in(Role::Teacher, ctx.etablissement_id)
            && (ctx.teacher_id == Some(user.user_id)
                || RelationshipRepo::teaches_class_subject(
                    &state.pool,
                    user.user_id,
                    ctx.classe_id,
                    ctx.matiere_id,
                )
                .await?));
    if !allowed {
        return Err(CoreError::Forbidden(format!(
            "Not allowed to grade submission {}",
            ctx.submission_id
        ))
        .into());
    }

    let before = SubmissionRepo::find_by_id(&state.pool, ctx.submission_id).await?;

    let commentaire = input
        .commentaire
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let submission =
        SubmissionRepo::grade(&state.pool, ctx.submission_id, input.note, commentaire, user.user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Submission",
                id: ctx.submission_id,
            })?;

    tracing::info!(
        submission_id = submission.id,
        note = input.note,
        graded_by = user.user_id,
        "Submission graded",
    );

    audit::record(
        &state.pool,
        NewAuditEntry {
            actor_id: user.user_id,
            action: ACTION_SUBMISSION_GRADE,
            entity_type: ENTITY_SUBMISSION,
            entity_id: Some(submission.id),
            etablissement_id: Some(ctx.etablissement_id),
            before: before.map(|b| json!(b)),
            after: Some(json!(submission)),
        },
    )
    .await;

    state.event_bus.publish(
        UsageEvent::new(SUBMISSION_GRADED)
            .with_actor(user.user_id)
            .with_etablissement(Some(ctx.etablissement_id))
            .with_payload(json!({
                "submission_id": submission.id,
                "assignment_id": ctx.assignment_id,
            })),
    );

    Ok(Json(SuccessResponse::new(SubmissionPayload { submission })))
}
