use std::sync::Arc;

use crate::config::ServerConfig;
use crate::storage::AttachmentStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; every service is constructed once in `main` (or in the
/// test harness) and shared behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: educ_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Usage analytics bus; handlers publish after a successful commit.
    pub event_bus: Arc<educ_events::EventBus>,
    pub llm: Arc<educ_llm::LlmClient>,
    /// Justification attachment storage.
    pub storage: Arc<dyn AttachmentStore>,
}
