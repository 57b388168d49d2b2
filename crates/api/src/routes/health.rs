//! Liveness and readiness endpoint for load balancers.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Readiness of each backing service.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: bool,
    pub storage: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when every check passes, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub checks: HealthChecks,
}

/// GET /health
///
/// Always answers 200 while the process is up; readiness is in the body.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (database, storage) = tokio::join!(
        educ_db::health_check(&state.pool),
        state.storage.check(),
    );

    if let Err(e) = &storage {
        tracing::warn!(error = %e, "Attachment storage not ready");
    }

    let checks = HealthChecks {
        database: database.is_ok(),
        storage: storage.is_ok(),
    };
    let status = if checks.database && checks.storage {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy: checks.database,
        checks,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
