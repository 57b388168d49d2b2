//! Library resource chunk search results.

use sqlx::FromRow;
use educ_core::rag::RetrievedChunk;
use educ_core::types::DbId;

/// A chunk matched by the vector search.
#[derive(Debug, Clone, FromRow)]
pub struct ChunkMatch {
    pub chunk_id: DbId,
    pub resource_id: DbId,
    pub title: String,
    pub content: String,
    pub similarity: f64,
}

impl From<ChunkMatch> for RetrievedChunk {
    fn from(m: ChunkMatch) -> Self {
        RetrievedChunk {
            chunk_id: m.chunk_id,
            resource_id: m.resource_id,
            title: m.title,
            content: m.content,
            similarity: m.similarity,
        }
    }
}
