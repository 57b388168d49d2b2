//! Repositories for the `classes` and `matieres` tables.

use std::collections::HashMap;

use sqlx::PgPool;
use educ_core::types::DbId;

use crate::models::school::{Class, Matiere};

const CLASS_COLUMNS: &str = "id, etablissement_id, name, level, created_at";
const MATIERE_COLUMNS: &str = "id, etablissement_id, name, coefficient, created_at";

pub struct ClassRepo;

impl ClassRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Class>, sqlx::Error> {
        let query = format!("SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1");
        sqlx::query_as::<_, Class>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Distinct classes the teacher is assigned to.
    pub async fn list_for_teacher(pool: &PgPool, teacher_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT classe_id FROM teacher_assignments WHERE teacher_id = $1 ORDER BY classe_id",
        )
        .bind(teacher_id)
        .fetch_all(pool)
        .await
    }
}

pub struct MatiereRepo;

impl MatiereRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Matiere>, sqlx::Error> {
        let query = format!("SELECT {MATIERE_COLUMNS} FROM matieres WHERE id = $1");
        sqlx::query_as::<_, Matiere>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Subject coefficients of an establishment, keyed by subject id.
    pub async fn coefficients(
        pool: &PgPool,
        etablissement_id: DbId,
    ) -> Result<HashMap<DbId, f64>, sqlx::Error> {
        let rows: Vec<(DbId, f64)> =
            sqlx::query_as("SELECT id, coefficient FROM matieres WHERE etablissement_id = $1")
                .bind(etablissement_id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().collect())
    }
}
