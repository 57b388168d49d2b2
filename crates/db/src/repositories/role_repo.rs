//! Repository for the `user_roles` table.

use sqlx::PgPool;
use educ_core::access::RoleGrant;
use educ_core::roles::Role;
use educ_core::types::DbId;

use crate::models::role::UserRoleRow;

pub struct RoleRepo;

impl RoleRepo {
    /// Raw role rows for a user.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<UserRoleRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRoleRow>(
            "SELECT role, etablissement_id FROM user_roles WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Role grants for a user. Rows with an unknown role name are skipped.
    pub async fn grants_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<RoleGrant>, sqlx::Error> {
        let rows = Self::list_for_user(pool, user_id).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match row.role.parse::<Role>() {
                Ok(role) => Some(RoleGrant::new(role, row.etablissement_id)),
                Err(e) => {
                    tracing::warn!(user_id, error = %e, "Ignoring unknown role assignment");
                    None
                }
            })
            .collect())
    }

    pub async fn assign(
        pool: &PgPool,
        user_id: DbId,
        role: Role,
        etablissement_id: Option<DbId>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role, etablissement_id) VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_user_roles DO NOTHING",
        )
        .bind(user_id)
        .bind(role.as_str())
        .bind(etablissement_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
