//! Repository for the `profiles` table.

use sqlx::PgPool;
use educ_core::types::DbId;

use crate::models::profile::{Profile, UserListEntry};

/// Column list for `profiles` queries.
const COLUMNS: &str = "\
    id, email, password_hash, full_name, avatar_url, phone, \
    is_active, created_at, updated_at";

/// Upper bound on a single user listing.
const MAX_LIST: i64 = 500;

pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive lookup used by login.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, Profile>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List users holding a role in the given establishment.
    ///
    /// `etablissement_id = None` lists across all establishments; `role`
    /// filters on one role name. Each entry carries the distinct roles the
    /// user holds within the filter.
    pub async fn list_users(
        pool: &PgPool,
        etablissement_id: Option<DbId>,
        role: Option<&str>,
    ) -> Result<Vec<UserListEntry>, sqlx::Error> {
        sqlx::query_as::<_, UserListEntry>(
            "SELECT p.id, p.email, p.full_name, p.phone, p.is_active, \
                    array_agg(DISTINCT ur.role ORDER BY ur.role) AS roles, p.created_at \
             FROM profiles p \
             JOIN user_roles ur ON ur.user_id = p.id \
             WHERE ($1::BIGINT IS NULL OR ur.etablissement_id = $1) \
               AND ($2::TEXT IS NULL OR ur.role = $2) \
             GROUP BY p.id \
             ORDER BY p.full_name, p.id \
             LIMIT $3",
        )
        .bind(etablissement_id)
        .bind(role)
        .bind(MAX_LIST)
        .fetch_all(pool)
        .await
    }
}
