//! Vector search over `resource_chunks`.
//!
//! The `embedding` column is pgvector's `vector(1536)`. The query embedding
//! is passed as a text literal and cast in SQL.

use sqlx::PgPool;
use educ_core::types::DbId;

use crate::models::library::ChunkMatch;

pub struct LibraryRepo;

impl LibraryRepo {
    /// Nearest chunks by cosine distance.
    ///
    /// `etablissement_ids = None` searches every establishment; a resource
    /// id restricts the search to that resource.
    pub async fn search_chunks(
        pool: &PgPool,
        embedding_literal: &str,
        etablissement_ids: Option<&[DbId]>,
        resource_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<ChunkMatch>, sqlx::Error> {
        sqlx::query_as::<_, ChunkMatch>(
            "SELECT c.id AS chunk_id, c.resource_id, r.title, c.content, \
                    (1 - (c.embedding <=> $1::vector))::float8 AS similarity \
             FROM resource_chunks c \
             JOIN resources r ON r.id = c.resource_id \
             WHERE c.embedding IS NOT NULL \
               AND ($2::BIGINT[] IS NULL OR r.etablissement_id = ANY($2)) \
               AND ($3::BIGINT IS NULL OR c.resource_id = $3) \
             ORDER BY c.embedding <=> $1::vector \
             LIMIT $4",
        )
        .bind(embedding_literal)
        .bind(etablissement_ids)
        .bind(resource_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Establishment of a resource.
    pub async fn resource_etablissement(
        pool: &PgPool,
        resource_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT etablissement_id FROM resources WHERE id = $1")
            .bind(resource_id)
            .fetch_optional(pool)
            .await
    }
}
