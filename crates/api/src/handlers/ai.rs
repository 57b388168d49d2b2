//! Language-model endpoints: QCM generation and library question answering.

use axum::extract::State;
use axum::Json;
use educ_core::access::Principal;
use educ_core::error::CoreError;
use educ_core::qcm::{
    build_scoring, build_user_prompt as qcm_prompt, sanitize_items, split_counts, DifficultyMix,
    QcmItem, Scoring, DEFAULT_QCM_COUNT, QCM_SYSTEM_PROMPT,
};
use educ_core::rag::{
    build_context, build_user_prompt as rag_prompt, citations, clamp_top_k, vector_literal,
    Citation, RetrievedChunk, NO_CONTEXT_ANSWER, RAG_SYSTEM_PROMPT,
};
use educ_core::types::DbId;
use educ_db::models::qcm::CreateQcmSet;
use educ_db::repositories::{LibraryRepo, QcmRepo};
use educ_events::bus::{QCM_GENERATED, RAG_QUERIED};
use educ_events::UsageEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::ValidJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// QCM generation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateQcmRequest {
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    /// Class level, e.g. `3e` or `Terminale D`.
    #[validate(length(min = 1, max = 50))]
    pub grade: String,
    #[validate(length(min = 1, max = 200))]
    pub theme: String,
    #[validate(range(min = 1, max = 50))]
    pub count: Option<u32>,
    pub mix: Option<DifficultyMix>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedQcm {
    pub id: DbId,
    pub items: Vec<QcmItem>,
    pub scoring: Scoring,
}

/// Establishment a generated set is filed under: the first one the caller
/// holds a role in, none for a global administrator.
fn home_establishment(principal: &Principal) -> Option<DbId> {
    principal.grants.iter().find_map(|g| g.etablissement_id)
}

/// POST /api/v1/ai-qcm-generate
///
/// Ask the model for a multiple-choice set, keep the well-formed items and
/// store the set. An upstream 429 is passed through as 429.
pub async fn generate_qcm(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    ValidJson(input): ValidJson<GenerateQcmRequest>,
) -> AppResult<Json<GeneratedQcm>> {
    let count = input.count.unwrap_or(DEFAULT_QCM_COUNT);
    let split = split_counts(count, &input.mix.unwrap_or_default())?;

    let prompt = qcm_prompt(
        input.subject.trim(),
        input.grade.trim(),
        input.theme.trim(),
        &split,
    );
    let raw = state.llm.chat_json(QCM_SYSTEM_PROMPT, &prompt).await?;

    let items = sanitize_items(&raw, count);
    if items.is_empty() {
        return Err(
            CoreError::Upstream("The language model returned no usable question".into()).into(),
        );
    }
    if items.len() < count as usize {
        tracing::warn!(
            requested = count,
            usable = items.len(),
            "Language model returned fewer usable QCM items than requested",
        );
    }
    let scoring = build_scoring(&items);

    let etablissement_id = home_establishment(&user.principal);
    let set = QcmRepo::create(
        &state.pool,
        &CreateQcmSet {
            etablissement_id,
            subject: input.subject.trim().to_string(),
            grade: input.grade.trim().to_string(),
            theme: input.theme.trim().to_string(),
            items: json!(items),
            scoring: json!(scoring),
            created_by: user.user_id,
        },
    )
    .await?;

    tracing::info!(
        qcm_id = set.id,
        items = items.len(),
        user_id = user.user_id,
        "QCM generated",
    );

    state.event_bus.publish(
        UsageEvent::new(QCM_GENERATED)
            .with_actor(user.user_id)
            .with_etablissement(etablissement_id)
            .with_payload(json!({
                "qcm_id": set.id,
                "requested": count,
                "items": items.len(),
            })),
    );

    Ok(Json(GeneratedQcm {
        id: set.id,
        items,
        scoring,
    }))
}

// ---------------------------------------------------------------------------
// Library question answering
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RagQueryRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
    pub resource_id: Option<DbId>,
    pub top_k: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RagAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
    /// The numbered excerpts the answer was grounded on.
    pub context: String,
}

/// Establishments whose library the caller may search; `None` means all.
fn searchable_establishments(principal: &Principal) -> AppResult<Option<Vec<DbId>>> {
    if principal.is_system_admin() {
        return Ok(None);
    }
    let mut ids: Vec<DbId> = principal
        .grants
        .iter()
        .filter_map(|g| g.etablissement_id)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Err(CoreError::Forbidden("No establishment library available".into()).into());
    }
    Ok(Some(ids))
}

/// POST /api/v1/ai-rag-query
///
/// Embed the question, retrieve the closest library chunks the caller may
/// read and answer from those excerpts only. When nothing is retrieved the
/// model is not called.
pub async fn rag_query(
    State(state): State<AppState>,
    user: AuthUser,
    ValidJson(input): ValidJson<RagQueryRequest>,
) -> AppResult<Json<RagAnswer>> {
    let scope = searchable_establishments(&user.principal)?;

    if let Some(resource_id) = input.resource_id {
        let owner = LibraryRepo::resource_etablissement(&state.pool, resource_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Resource",
                id: resource_id,
            })?;
        if let Some(allowed) = &scope {
            if !allowed.contains(&owner) {
                return Err(
                    CoreError::Forbidden(format!("Access to resource {resource_id} denied")).into(),
                );
            }
        }
    }

    let top_k = clamp_top_k(input.top_k);
    let question = input.question.trim();

    let embedding = state.llm.embed(question).await?;
    let chunks: Vec<RetrievedChunk> = LibraryRepo::search_chunks(
        &state.pool,
        &vector_literal(&embedding),
        scope.as_deref(),
        input.resource_id,
        top_k,
    )
    .await?
    .into_iter()
    .map(RetrievedChunk::from)
    .collect();

    let answer = if chunks.is_empty() {
        RagAnswer {
            answer: NO_CONTEXT_ANSWER.to_string(),
            citations: Vec::new(),
            context: String::new(),
        }
    } else {
        let context = build_context(&chunks);
        let raw = state
            .llm
            .chat_json(RAG_SYSTEM_PROMPT, &rag_prompt(question, &context))
            .await?;
        let text = raw
            .get("answer")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| {
                CoreError::Upstream("The language model returned no answer".into())
            })?;
        RagAnswer {
            answer: text.to_string(),
            citations: citations(&chunks),
            context,
        }
    };

    tracing::info!(
        user_id = user.user_id,
        top_k,
        retrieved = chunks.len(),
        "Library question answered",
    );

    state.event_bus.publish(
        UsageEvent::new(RAG_QUERIED)
            .with_actor(user.user_id)
            .with_payload(json!({
                "resource_id": input.resource_id,
                "top_k": top_k,
                "retrieved": chunks.len(),
            })),
    );

    Ok(Json(answer))
}
