//! Relationship predicates between people and school structures.
//!
//! Every handler that touches another person's data checks one of these
//! before reading or writing.

use sqlx::PgPool;
use educ_core::types::DbId;

pub struct RelationshipRepo;

impl RelationshipRepo {
    /// Whether `parent_id` is linked to the student.
    pub async fn is_parent_of(
        pool: &PgPool,
        parent_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM parent_students WHERE parent_id = $1 AND student_id = $2)",
        )
        .bind(parent_id)
        .bind(student_id)
        .fetch_one(pool)
        .await
    }

    /// Whether the student record belongs to `profile_id`.
    pub async fn is_student_self(
        pool: &PgPool,
        profile_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE id = $1 AND profile_id = $2)")
            .bind(student_id)
            .bind(profile_id)
            .fetch_one(pool)
            .await
    }

    /// Whether the teacher has any assignment in the class.
    pub async fn teaches_class(
        pool: &PgPool,
        teacher_id: DbId,
        classe_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM teacher_assignments \
                           WHERE teacher_id = $1 AND classe_id = $2)",
        )
        .bind(teacher_id)
        .bind(classe_id)
        .fetch_one(pool)
        .await
    }

    /// Whether the teacher is assigned to the subject in the class.
    pub async fn teaches_class_subject(
        pool: &PgPool,
        teacher_id: DbId,
        classe_id: DbId,
        matiere_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM teacher_assignments \
                           WHERE teacher_id = $1 AND classe_id = $2 AND matiere_id = $3)",
        )
        .bind(teacher_id)
        .bind(classe_id)
        .bind(matiere_id)
        .fetch_one(pool)
        .await
    }
}
