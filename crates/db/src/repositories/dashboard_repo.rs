//! Headcounts for the administration dashboard.
//!
//! Each count is its own query so a dashboard can degrade one figure at a
//! time. `None` counts across every establishment.

use sqlx::PgPool;
use educ_core::types::DbId;

pub struct DashboardRepo;

impl DashboardRepo {
    pub async fn count_students(
        pool: &PgPool,
        etablissement_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM students WHERE ($1::BIGINT IS NULL OR etablissement_id = $1)",
        )
        .bind(etablissement_id)
        .fetch_one(pool)
        .await
    }

    pub async fn count_classes(
        pool: &PgPool,
        etablissement_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM classes WHERE ($1::BIGINT IS NULL OR etablissement_id = $1)",
        )
        .bind(etablissement_id)
        .fetch_one(pool)
        .await
    }

    /// Distinct users holding the TEACHER role.
    pub async fn count_teachers(
        pool: &PgPool,
        etablissement_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(DISTINCT user_id) FROM user_roles \
             WHERE role = 'TEACHER' AND ($1::BIGINT IS NULL OR etablissement_id = $1)",
        )
        .bind(etablissement_id)
        .fetch_one(pool)
        .await
    }
}
