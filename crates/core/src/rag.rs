//! Retrieval-augmented question answering over library resources.

use serde::Serialize;

use crate::types::DbId;

pub const DEFAULT_TOP_K: i64 = 5;
pub const MAX_TOP_K: i64 = 20;

/// Answer returned when retrieval finds nothing; the model is not called.
pub const NO_CONTEXT_ANSWER: &str =
    "Je n'ai trouvé aucun passage pertinent dans la bibliothèque pour répondre à cette question.";

pub const RAG_SYSTEM_PROMPT: &str = "Tu es l'assistant de la bibliothèque numérique d'un \
établissement scolaire. Réponds en français en t'appuyant uniquement sur les extraits fournis. \
Cite les extraits utilisés par leur numéro entre crochets, par exemple [1]. Si les extraits ne \
suffisent pas, dis-le. Réponds avec un objet JSON {\"answer\": string}.";

/// Clamp a requested `topK` to `1..=MAX_TOP_K`, defaulting when absent.
pub fn clamp_top_k(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_TOP_K).clamp(1, MAX_TOP_K)
}

/// pgvector text literal (`[0.1,0.2,...]`), cast with `::vector` in SQL.
pub fn vector_literal(embedding: &[f32]) -> String {
    let parts: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(","))
}

/// A chunk returned by the similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub chunk_id: DbId,
    pub resource_id: DbId,
    pub title: String,
    pub content: String,
    /// `1 - cosine distance`.
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    /// One-based, matching the `[n]` markers in the context.
    pub index: usize,
    pub resource_id: DbId,
    pub chunk_id: DbId,
    pub title: String,
    pub similarity: f64,
}

/// Numbered context block handed to the model.
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, c)| format!("[{}] {}\n{}", i + 1, c.title, c.content.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn citations(chunks: &[RetrievedChunk]) -> Vec<Citation> {
    chunks
        .iter()
        .enumerate()
        .map(|(i, c)| Citation {
            index: i + 1,
            resource_id: c.resource_id,
            chunk_id: c.chunk_id,
            title: c.title.clone(),
            similarity: c.similarity,
        })
        .collect()
}

pub fn build_user_prompt(question: &str, context: &str) -> String {
    format!("Extraits :\n{context}\n\nQuestion : {}", question.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: DbId, title: &str, content: &str) -> RetrievedChunk {
        RetrievedChunk {
            chunk_id: id,
            resource_id: 100 + id,
            title: title.into(),
            content: content.into(),
            similarity: 0.9,
        }
    }

    #[test]
    fn top_k_is_clamped() {
        assert_eq!(clamp_top_k(None), 5);
        assert_eq!(clamp_top_k(Some(0)), 1);
        assert_eq!(clamp_top_k(Some(-3)), 1);
        assert_eq!(clamp_top_k(Some(8)), 8);
        assert_eq!(clamp_top_k(Some(500)), 20);
    }

    #[test]
    fn vector_literal_format() {
        assert_eq!(vector_literal(&[0.5, -1.0, 2.25]), "[0.5,-1,2.25]");
        assert_eq!(vector_literal(&[]), "[]");
    }

    #[test]
    fn context_is_numbered_in_order() {
        let chunks = [chunk(1, "Photosynthèse", " La lumière... "), chunk(2, "Cellule", "Le noyau")];
        let context = build_context(&chunks);
        assert_eq!(context, "[1] Photosynthèse\nLa lumière...\n\n[2] Cellule\nLe noyau");

        let cites = citations(&chunks);
        assert_eq!(cites.len(), 2);
        assert_eq!(cites[1].index, 2);
        assert_eq!(cites[1].resource_id, 102);
    }

    #[test]
    fn prompt_contains_question_and_context() {
        let prompt = build_user_prompt("  Qu'est-ce qu'un noyau ? ", "[1] Cellule\nLe noyau");
        assert!(prompt.ends_with("Question : Qu'est-ce qu'un noyau ?"));
        assert!(prompt.contains("[1] Cellule"));
    }
}
