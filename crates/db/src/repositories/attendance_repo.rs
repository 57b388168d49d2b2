//! Repository for the `attendance` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use educ_core::attendance::Decision;
use educ_core::batch::dedup_last_wins;
use educ_core::types::DbId;

use crate::models::attendance::{Attendance, AttendanceCounts, DeclareAttendance};

/// Column list for `attendance` queries.
const COLUMNS: &str = "\
    id, student_id, etablissement_id, date, status, reason, justification_url, \
    decision, decision_note, validated, validated_by, validated_at, declared_by, \
    created_at, updated_at";

/// Records awaiting an administrative decision.
const PENDING_FILTER: &str = "status IN ('ABSENT', 'LATE') AND decision = 'PENDING'";

pub struct AttendanceRepo;

impl AttendanceRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attendance WHERE id = $1");
        sqlx::query_as::<_, Attendance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Declare attendance for one date in a single transaction.
    ///
    /// Rows repeating a student collapse to the last one. Each row is
    /// upserted on `(student_id, date)`; an existing record keeps its
    /// justification and decision. Any failure rolls back the whole batch.
    pub async fn bulk_upsert(
        pool: &PgPool,
        etablissement_id: DbId,
        date: NaiveDate,
        declared_by: DbId,
        rows: Vec<DeclareAttendance>,
    ) -> Result<Vec<Attendance>, sqlx::Error> {
        let rows = dedup_last_wins(rows, |r| r.student_id);

        let query = format!(
            "INSERT INTO attendance (student_id, etablissement_id, date, status, reason, declared_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT uq_attendance_student_date DO UPDATE \
             SET status = EXCLUDED.status, \
                 reason = COALESCE(EXCLUDED.reason, attendance.reason), \
                 etablissement_id = EXCLUDED.etablissement_id, \
                 declared_by = EXCLUDED.declared_by, \
                 updated_at = now() \
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let mut stored = Vec::with_capacity(rows.len());
        for row in &rows {
            let record = sqlx::query_as::<_, Attendance>(&query)
                .bind(row.student_id)
                .bind(etablissement_id)
                .bind(date)
                .bind(row.status.as_str())
                .bind(&row.reason)
                .bind(declared_by)
                .fetch_one(&mut *tx)
                .await?;
            stored.push(record);
        }
        tx.commit().await?;

        Ok(stored)
    }

    /// Record an administrative decision on a justification.
    pub async fn decide(
        pool: &PgPool,
        id: DbId,
        decision: Decision,
        note: Option<&str>,
        validated_by: DbId,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!(
            "UPDATE attendance \
             SET decision = $2, decision_note = $3, validated = true, \
                 validated_by = $4, validated_at = now(), updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(id)
            .bind(decision.as_str())
            .bind(note)
            .bind(validated_by)
            .fetch_optional(pool)
            .await
    }

    /// Attach a justification and reopen the record for decision.
    ///
    /// A `None` reason or url keeps the stored value.
    pub async fn justify(
        pool: &PgPool,
        id: DbId,
        reason: Option<&str>,
        justification_url: Option<&str>,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!(
            "UPDATE attendance \
             SET reason = COALESCE($2, reason), \
                 justification_url = COALESCE($3, justification_url), \
                 decision = 'PENDING', decision_note = NULL, validated = false, \
                 validated_by = NULL, validated_at = NULL, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(id)
            .bind(reason)
            .bind(justification_url)
            .fetch_optional(pool)
            .await
    }

    /// Total and absent counts since `from` (inclusive), optionally scoped.
    pub async fn counts_since(
        pool: &PgPool,
        etablissement_id: Option<DbId>,
        from: NaiveDate,
    ) -> Result<AttendanceCounts, sqlx::Error> {
        sqlx::query_as::<_, AttendanceCounts>(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE status = 'ABSENT') AS absent \
             FROM attendance \
             WHERE date >= $2 AND ($1::BIGINT IS NULL OR etablissement_id = $1)",
        )
        .bind(etablissement_id)
        .bind(from)
        .fetch_one(pool)
        .await
    }

    /// Counts since `from` for the students of the given classes.
    pub async fn counts_for_classes_since(
        pool: &PgPool,
        classe_ids: &[DbId],
        from: NaiveDate,
    ) -> Result<AttendanceCounts, sqlx::Error> {
        sqlx::query_as::<_, AttendanceCounts>(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE a.status = 'ABSENT') AS absent \
             FROM attendance a \
             JOIN students s ON s.id = a.student_id \
             WHERE s.classe_id = ANY($1) AND a.date >= $2",
        )
        .bind(classe_ids)
        .bind(from)
        .fetch_one(pool)
        .await
    }

    /// Counts since `from` for one student.
    pub async fn counts_for_student_since(
        pool: &PgPool,
        student_id: DbId,
        from: NaiveDate,
    ) -> Result<AttendanceCounts, sqlx::Error> {
        sqlx::query_as::<_, AttendanceCounts>(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE status = 'ABSENT') AS absent \
             FROM attendance WHERE student_id = $1 AND date >= $2",
        )
        .bind(student_id)
        .bind(from)
        .fetch_one(pool)
        .await
    }

    /// Absences and late arrivals awaiting a decision, optionally scoped.
    pub async fn count_pending(
        pool: &PgPool,
        etablissement_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM attendance \
             WHERE {PENDING_FILTER} AND ($1::BIGINT IS NULL OR etablissement_id = $1)"
        );
        sqlx::query_scalar(&query)
            .bind(etablissement_id)
            .fetch_one(pool)
            .await
    }

    pub async fn count_pending_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let query =
            format!("SELECT COUNT(*) FROM attendance WHERE {PENDING_FILTER} AND student_id = $1");
        sqlx::query_scalar(&query)
            .bind(student_id)
            .fetch_one(pool)
            .await
    }
}
