//! Report card generation.

use axum::extract::State;
use axum::Json;
use educ_core::grading::{general_average, subject_averages, validate_period, SubjectAverage};
use educ_core::types::DbId;
use educ_db::models::grade::ReportCard;
use educ_db::repositories::{GradeRepo, MatiereRepo, ReportCardRepo};
use educ_events::bus::REPORT_CARD_GENERATED;
use educ_events::UsageEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::access::{ensure_student_access, require_student};
use crate::error::AppResult;
use crate::extract::ValidJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateReportCardRequest {
    pub student_id: DbId,
    #[validate(length(min = 1, max = 16))]
    pub period: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCardResult {
    pub report_card: ReportCard,
    pub subject_averages: Vec<SubjectAverage>,
    pub general_average: Option<f64>,
}

/// POST /api/v1/generate-report-card
///
/// Compute subject and general averages from the student's validated
/// grades for the period and store them as the period's report card.
/// Regenerating overwrites the previous card.
pub async fn generate(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(input): ValidJson<GenerateReportCardRequest>,
) -> AppResult<Json<DataResponse<ReportCardResult>>> {
    validate_period(&input.period)?;

    let student = require_student(&state.pool, input.student_id).await?;
    ensure_student_access(&state.pool, &user.principal, &student).await?;

    let grades =
        GradeRepo::validated_for_student(&state.pool, student.id, Some(&input.period)).await?;
    let coefficients = MatiereRepo::coefficients(&state.pool, student.etablissement_id).await?;

    let subjects = subject_averages(&grades, &coefficients);
    let general = general_average(&subjects);

    let report_card = ReportCardRepo::upsert(
        &state.pool,
        student.id,
        student.etablissement_id,
        &input.period,
        general,
        &json!(subjects),
        user.user_id,
    )
    .await?;

    tracing::info!(
        student_id = student.id,
        period = %input.period,
        subjects = subjects.len(),
        general_average = ?general,
        "Report card generated",
    );

    state.event_bus.publish(
        UsageEvent::new(REPORT_CARD_GENERATED)
            .with_actor(user.user_id)
            .with_etablissement(Some(student.etablissement_id))
            .with_payload(json!({
                "student_id": student.id,
                "period": input.period,
            })),
    );

    Ok(Json(DataResponse {
        data: ReportCardResult {
            report_card,
            subject_averages: subjects,
            general_average: general,
        },
    }))
}
