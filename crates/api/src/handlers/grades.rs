//! Bulk grade entry.

use axum::extract::State;
use axum::Json;
use educ_core::error::CoreError;
use educ_core::grading::{validate_period, DEFAULT_COEFFICIENT};
use educ_core::types::DbId;
use educ_db::models::grade::{Grade, GradeBatchContext, UpsertGrade};
use educ_db::repositories::{GradeRepo, GradeUpsertOutcome, MatiereRepo, StudentRepo};
use educ_events::bus::GRADES_UPSERTED;
use educ_events::UsageEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::access::{ensure_class_access, require_class};
use crate::error::AppResult;
use crate::extract::ValidJson;
use crate::middleware::rbac::RequireStaff;
use crate::response::SuccessResponse;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct GradeRow {
    pub student_id: DbId,
    #[validate(range(min = 0.0, max = 20.0))]
    pub score: f64,
    #[validate(range(exclusive_min = 0.0, max = 100.0))]
    pub coefficient: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GradesBulkRequest {
    pub matiere_id: DbId,
    pub classe_id: DbId,
    #[validate(length(min = 1, max = 16))]
    pub period: String,
    #[validate(length(min = 1, max = 500), nested)]
    pub rows: Vec<GradeRow>,
}

#[derive(Debug, Serialize)]
pub struct GradesPayload {
    pub count: usize,
    pub grades: Vec<Grade>,
}

/// POST /api/v1/grades-bulk-upsert
///
/// Upsert the grades of one class for one subject and period. The caller
/// must teach that subject in that class, or administer its establishment.
/// A locked period answers 409 and writes nothing.
pub async fn bulk_upsert(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    ValidJson(input): ValidJson<GradesBulkRequest>,
) -> AppResult<Json<SuccessResponse<GradesPayload>>> {
    validate_period(&input.period)?;

    let class = require_class(&state.pool, input.classe_id).await?;
    let matiere = MatiereRepo::find_by_id(&state.pool, input.matiere_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Subject",
            id: input.matiere_id,
        })?;
    if matiere.etablissement_id != class.etablissement_id {
        return Err(CoreError::Validation(format!(
            "Subject {} does not belong to the establishment of class {}",
            matiere.id, class.id
        ))
        .into());
    }

    ensure_class_access(&state.pool, &user.principal, &class, Some(matiere.id)).await?;

    let student_ids: Vec<DbId> = input.rows.iter().map(|r| r.student_id).collect();
    let outside = StudentRepo::ids_outside_class(&state.pool, class.id, &student_ids).await?;
    if !outside.is_empty() {
        return Err(CoreError::Validation(format!(
            "Students not enrolled in class {}: {outside:?}",
            class.id
        ))
        .into());
    }

    let ctx = GradeBatchContext {
        etablissement_id: class.etablissement_id,
        classe_id: class.id,
        matiere_id: matiere.id,
        period: input.period,
        teacher_id: user.user_id,
    };
    let rows: Vec<UpsertGrade> = input
        .rows
        .into_iter()
        .map(|r| UpsertGrade {
            student_id: r.student_id,
            score: r.score,
            coefficient: r.coefficient.unwrap_or(DEFAULT_COEFFICIENT),
        })
        .collect();

    let grades = match GradeRepo::bulk_upsert(&state.pool, &ctx, rows).await? {
        GradeUpsertOutcome::Upserted(grades) => grades,
        GradeUpsertOutcome::PeriodLocked => {
            return Err(CoreError::Conflict(format!(
                "Period {} is locked for establishment {}",
                ctx.period, ctx.etablissement_id
            ))
            .into());
        }
    };

    tracing::info!(
        classe_id = ctx.classe_id,
        matiere_id = ctx.matiere_id,
        period = %ctx.period,
        count = grades.len(),
        teacher_id = user.user_id,
        "Grades upserted",
    );

    state.event_bus.publish(
        UsageEvent::new(GRADES_UPSERTED)
            .with_actor(user.user_id)
            .with_etablissement(Some(ctx.etablissement_id))
            .with_payload(json!({
                "classe_id": ctx.classe_id,
                "matiere_id": ctx.matiere_id,
                "period": ctx.period,
                "count": grades.len(),
            })),
    );

    Ok(Json(SuccessResponse::new(GradesPayload {
        count: grades.len(),
        grades,
    })))
}
