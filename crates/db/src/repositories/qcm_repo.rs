//! Repository for the `qcm_sets` table.

use sqlx::PgPool;

use crate::models::qcm::{CreateQcmSet, QcmSet};

const COLUMNS: &str = "\
    id, etablissement_id, subject, grade, theme, items, scoring, created_by, created_at";

pub struct QcmRepo;

impl QcmRepo {
    pub async fn create(pool: &PgPool, input: &CreateQcmSet) -> Result<QcmSet, sqlx::Error> {
        let query = format!(
            "INSERT INTO qcm_sets (etablissement_id, subject, grade, theme, items, scoring, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QcmSet>(&query)
            .bind(input.etablissement_id)
            .bind(&input.subject)
            .bind(&input.grade)
            .bind(&input.theme)
            .bind(&input.items)
            .bind(&input.scoring)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }
}
