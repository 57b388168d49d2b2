//! Repository for the `report_cards` table.

use sqlx::PgPool;
use educ_core::types::DbId;

use crate::models::grade::ReportCard;

const COLUMNS: &str = "\
    id, student_id, etablissement_id, period, general_average, subject_averages, \
    published, generated_by, generated_at";

pub struct ReportCardRepo;

impl ReportCardRepo {
    /// Insert or recompute the report card of a student for a period.
    ///
    /// Regeneration replaces the averages and keeps the publication flag.
    pub async fn upsert(
        pool: &PgPool,
        student_id: DbId,
        etablissement_id: DbId,
        period: &str,
        general_average: Option<f64>,
        subject_averages: &serde_json::Value,
        generated_by: DbId,
    ) -> Result<ReportCard, sqlx::Error> {
        let query = format!(
            "INSERT INTO report_cards \
                (student_id, etablissement_id, period, general_average, subject_averages, generated_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT uq_report_cards_student_period DO UPDATE \
             SET general_average = EXCLUDED.general_average, \
                 subject_averages = EXCLUDED.subject_averages, \
                 generated_by = EXCLUDED.generated_by, \
                 generated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReportCard>(&query)
            .bind(student_id)
            .bind(etablissement_id)
            .bind(period)
            .bind(general_average)
            .bind(subject_averages)
            .bind(generated_by)
            .fetch_one(pool)
            .await
    }

    pub async fn count_published(
        pool: &PgPool,
        etablissement_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM report_cards \
             WHERE published AND ($1::BIGINT IS NULL OR etablissement_id = $1)",
        )
        .bind(etablissement_id)
        .fetch_one(pool)
        .await
    }
}
