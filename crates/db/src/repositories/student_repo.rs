//! Repository for the `students` table.

use sqlx::PgPool;
use educ_core::types::DbId;

use crate::models::school::{ChildSummary, Student};

const COLUMNS: &str = "id, profile_id, etablissement_id, classe_id, matricule, created_at";

const CHILD_SELECT: &str = "\
    SELECT s.id AS student_id, s.profile_id, p.full_name, p.avatar_url, s.matricule, \
           s.etablissement_id, s.classe_id, c.name AS classe_name \
    FROM students s \
    JOIN profiles p ON p.id = s.profile_id \
    LEFT JOIN classes c ON c.id = s.classe_id";

pub struct StudentRepo;

impl StudentRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_profile(
        pool: &PgPool,
        profile_id: DbId,
    ) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE profile_id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(profile_id)
            .fetch_optional(pool)
            .await
    }

    /// Ids from `student_ids` that are not enrolled in the class.
    ///
    /// Unknown ids are reported too.
    pub async fn ids_outside_class(
        pool: &PgPool,
        classe_id: DbId,
        student_ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT requested.id FROM unnest($2::BIGINT[]) AS requested(id) \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM students s WHERE s.id = requested.id AND s.classe_id = $1 \
             ) \
             ORDER BY requested.id",
        )
        .bind(classe_id)
        .bind(student_ids)
        .fetch_all(pool)
        .await
    }

    pub async fn child_summary(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Option<ChildSummary>, sqlx::Error> {
        let query = format!("{CHILD_SELECT} WHERE s.id = $1");
        sqlx::query_as::<_, ChildSummary>(&query)
            .bind(student_id)
            .fetch_optional(pool)
            .await
    }

    /// Children linked to a parent, by name.
    pub async fn list_children(
        pool: &PgPool,
        parent_id: DbId,
    ) -> Result<Vec<ChildSummary>, sqlx::Error> {
        let query = format!(
            "{CHILD_SELECT} JOIN parent_students ps ON ps.student_id = s.id \
             WHERE ps.parent_id = $1 ORDER BY p.full_name, s.id"
        );
        sqlx::query_as::<_, ChildSummary>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }
}
