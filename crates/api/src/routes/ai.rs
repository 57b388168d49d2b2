use axum::routing::post;
use axum::Router;

use crate::handlers::ai;
use crate::state::AppState;

/// ```text
/// POST /ai-qcm-generate   -> generate_qcm
/// POST /ai-rag-query      -> rag_query
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ai-qcm-generate", post(ai::generate_qcm))
        .route("/ai-rag-query", post(ai::rag_query))
}
