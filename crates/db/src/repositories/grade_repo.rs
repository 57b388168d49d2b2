//! Repository for the `grades` and `grading_periods` tables.

use sqlx::PgPool;
use educ_core::batch::dedup_last_wins;
use educ_core::grading::WeightedGrade;
use educ_core::types::DbId;

use crate::models::grade::{
    ClassAverage, Grade, GradeBatchContext, GradeWithSubject, GradingPeriod, UpsertGrade,
};

/// Column list for `grades` queries.
const COLUMNS: &str = "\
    id, student_id, matiere_id, classe_id, etablissement_id, period, score, \
    coefficient, validated, teacher_id, created_at, updated_at";

const PERIOD_COLUMNS: &str =
    "id, etablissement_id, period, locked, locked_by, locked_at, created_at";

/// Result of a bulk grade upsert.
#[derive(Debug)]
pub enum GradeUpsertOutcome {
    Upserted(Vec<Grade>),
    /// The period is locked for the establishment; nothing was written.
    PeriodLocked,
}

/// Result of locking a grading period.
#[derive(Debug)]
pub struct PeriodLockOutcome {
    pub period: GradingPeriod,
    /// Lock state before this call.
    pub was_locked: bool,
    pub grades_validated: u64,
}

pub struct GradeRepo;

impl GradeRepo {
    /// Upsert a batch of grades for one (class, subject, period) context.
    ///
    /// The period row is created on first use and read with `FOR SHARE` so a
    /// concurrent lock waits for this batch to finish. Rows repeating a
    /// student collapse to the last one.
    pub async fn bulk_upsert(
        pool: &PgPool,
        ctx: &GradeBatchContext,
        rows: Vec<UpsertGrade>,
    ) -> Result<GradeUpsertOutcome, sqlx::Error> {
        let rows = dedup_last_wins(rows, |r| r.student_id);

        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO grading_periods (etablissement_id, period) VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_grading_periods DO NOTHING",
        )
        .bind(ctx.etablissement_id)
        .bind(&ctx.period)
        .execute(&mut *tx)
        .await?;

        let locked: bool = sqlx::query_scalar(
            "SELECT locked FROM grading_periods \
             WHERE etablissement_id = $1 AND period = $2 FOR SHARE",
        )
        .bind(ctx.etablissement_id)
        .bind(&ctx.period)
        .fetch_one(&mut *tx)
        .await?;

        if locked {
            tx.rollback().await?;
            return Ok(GradeUpsertOutcome::PeriodLocked);
        }

        let query = format!(
            "INSERT INTO grades \
                (student_id, matiere_id, classe_id, etablissement_id, period, score, coefficient, teacher_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT ON CONSTRAINT uq_grades_student_matiere_period DO UPDATE \
             SET score = EXCLUDED.score, \
                 coefficient = EXCLUDED.coefficient, \
                 classe_id = EXCLUDED.classe_id, \
                 teacher_id = EXCLUDED.teacher_id, \
                 validated = false, \
                 updated_at = now() \
             RETURNING {COLUMNS}"
        );

        let mut stored = Vec::with_capacity(rows.len());
        for row in &rows {
            let grade = sqlx::query_as::<_, Grade>(&query)
                .bind(row.student_id)
                .bind(ctx.matiere_id)
                .bind(ctx.classe_id)
                .bind(ctx.etablissement_id)
                .bind(&ctx.period)
                .bind(row.score)
                .bind(row.coefficient)
                .bind(ctx.teacher_id)
                .fetch_one(&mut *tx)
                .await?;
            stored.push(grade);
        }
        tx.commit().await?;

        Ok(GradeUpsertOutcome::Upserted(stored))
    }

    pub async fn find_period(
        pool: &PgPool,
        etablissement_id: DbId,
        period: &str,
    ) -> Result<Option<GradingPeriod>, sqlx::Error> {
        let query = format!(
            "SELECT {PERIOD_COLUMNS} FROM grading_periods WHERE etablissement_id = $1 AND period = $2"
        );
        sqlx::query_as::<_, GradingPeriod>(&query)
            .bind(etablissement_id)
            .bind(period)
            .fetch_optional(pool)
            .await
    }

    /// Lock a period and validate all its grades in one transaction.
    pub async fn lock_period(
        pool: &PgPool,
        etablissement_id: DbId,
        period: &str,
        locked_by: DbId,
    ) -> Result<PeriodLockOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let was_locked: Option<bool> = sqlx::query_scalar(
            "SELECT locked FROM grading_periods \
             WHERE etablissement_id = $1 AND period = $2 FOR UPDATE",
        )
        .bind(etablissement_id)
        .bind(period)
        .fetch_optional(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO grading_periods (etablissement_id, period, locked, locked_by, locked_at) \
             VALUES ($1, $2, true, $3, now()) \
             ON CONFLICT ON CONSTRAINT uq_grading_periods DO UPDATE \
             SET locked = true, locked_by = EXCLUDED.locked_by, locked_at = EXCLUDED.locked_at \
             RETURNING {PERIOD_COLUMNS}"
        );
        let locked = sqlx::query_as::<_, GradingPeriod>(&query)
            .bind(etablissement_id)
            .bind(period)
            .bind(locked_by)
            .fetch_one(&mut *tx)
            .await?;

        let validated = sqlx::query(
            "UPDATE grades SET validated = true, updated_at = now() \
             WHERE etablissement_id = $1 AND period = $2 AND validated = false",
        )
        .bind(etablissement_id)
        .bind(period)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PeriodLockOutcome {
            period: locked,
            was_locked: was_locked.unwrap_or(false),
            grades_validated: validated.rows_affected(),
        })
    }

    /// Validated grades of a student, optionally restricted to one period.
    pub async fn validated_for_student(
        pool: &PgPool,
        student_id: DbId,
        period: Option<&str>,
    ) -> Result<Vec<WeightedGrade>, sqlx::Error> {
        let rows: Vec<(DbId, f64, f64)> = sqlx::query_as(
            "SELECT matiere_id, score, coefficient FROM grades \
             WHERE student_id = $1 AND validated = true \
               AND ($2::TEXT IS NULL OR period = $2) \
             ORDER BY matiere_id, id",
        )
        .bind(student_id)
        .bind(period)
        .fetch_all(pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(matiere_id, score, coefficient)| WeightedGrade {
                matiere_id,
                score,
                coefficient,
            })
            .collect())
    }

    /// Most recently updated grades of a student.
    pub async fn recent_for_student(
        pool: &PgPool,
        student_id: DbId,
        limit: i64,
    ) -> Result<Vec<GradeWithSubject>, sqlx::Error> {
        sqlx::query_as::<_, GradeWithSubject>(
            "SELECT g.id, g.matiere_id, m.name AS matiere_name, g.period, g.score, \
                    g.coefficient, g.validated, g.updated_at \
             FROM grades g JOIN matieres m ON m.id = g.matiere_id \
             WHERE g.student_id = $1 \
             ORDER BY g.updated_at DESC, g.id DESC \
             LIMIT $2",
        )
        .bind(student_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Coefficient-weighted average of validated grades per (class, subject)
    /// over a teacher's assignments. Draft grades are not counted.
    pub async fn class_averages_for_teacher(
        pool: &PgPool,
        teacher_id: DbId,
    ) -> Result<Vec<ClassAverage>, sqlx::Error> {
        sqlx::query_as::<_, ClassAverage>(
            "SELECT ta.classe_id, c.name AS classe_name, ta.matiere_id, m.name AS matiere_name, \
                    round((SUM(g.score * g.coefficient) \
                           / NULLIF(SUM(g.coefficient), 0))::numeric, 2)::float8 AS average, \
                    COUNT(g.id) AS grade_count \
             FROM teacher_assignments ta \
             JOIN classes c ON c.id = ta.classe_id \
             JOIN matieres m ON m.id = ta.matiere_id \
             LEFT JOIN grades g ON g.classe_id = ta.classe_id \
                               AND g.matiere_id = ta.matiere_id \
                               AND g.validated \
             WHERE ta.teacher_id = $1 \
             GROUP BY ta.classe_id, c.name, ta.matiere_id, m.name \
             ORDER BY c.name, m.name",
        )
        .bind(teacher_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &PgPool, etablissement_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM grades WHERE ($1::BIGINT IS NULL OR etablissement_id = $1)",
        )
        .bind(etablissement_id)
        .fetch_one(pool)
        .await
    }
}
