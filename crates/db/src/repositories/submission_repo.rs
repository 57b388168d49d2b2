//! Repository for the `submissions` table.

use sqlx::PgPool;
use educ_core::types::DbId;

use crate::models::submission::{Submission, SubmissionContext};

const COLUMNS: &str = "\
    id, assignment_id, student_id, content, file_url, submitted_at, note, \
    commentaire, graded_by, graded_at";

pub struct SubmissionRepo;

impl SubmissionRepo {
    /// The submission's assignment context, for authorization.
    pub async fn find_context(
        pool: &PgPool,
        submission_id: DbId,
    ) -> Result<Option<SubmissionContext>, sqlx::Error> {
        sqlx::query_as::<_, SubmissionContext>(
            "SELECT s.id AS submission_id, a.id AS assignment_id, a.classe_id, a.matiere_id, \
                    a.teacher_id, a.etablissement_id \
             FROM submissions s JOIN assignments a ON a.id = s.assignment_id \
             WHERE s.id = $1",
        )
        .bind(submission_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions WHERE id = $1");
        sqlx::query_as::<_, Submission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn grade(
        pool: &PgPool,
        id: DbId,
        note: f64,
        commentaire: Option<&str>,
        graded_by: DbId,
    ) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!(
            "UPDATE submissions \
             SET note = $2, commentaire = $3, graded_by = $4, graded_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(id)
            .bind(note)
            .bind(commentaire)
            .bind(graded_by)
            .fetch_optional(pool)
            .await
    }

    /// Ungraded submissions to the teacher's assignments.
    pub async fn count_pending_for_teacher(
        pool: &PgPool,
        teacher_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM submissions s JOIN assignments a ON a.id = s.assignment_id \
             WHERE a.teacher_id = $1 AND s.note IS NULL",
        )
        .bind(teacher_id)
        .fetch_one(pool)
        .await
    }
}
