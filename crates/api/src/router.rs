//! HTTP surface of the school backend.
//!
//! The binary and the integration tests both go through
//! [`build_app_router`], so tests exercise the same middleware as production.
//! Justification attachments have no static mount; they are only reachable
//! through the authenticated `/api/v1/justifications/{attendance_id}/file`
//! handler.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Prefix of every versioned endpoint. `/health` sits outside it.
pub const API_PREFIX: &str = "/api/v1";

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Preflight responses may be cached by browsers for this long.
const CORS_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Assemble routes and middleware into the application [`Router`].
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let routes = Router::new()
        .merge(routes::health::router())
        .nest(API_PREFIX, routes::api_routes())
        .fallback(route_not_found);

    with_middleware(routes, config).with_state(state)
}

/// Wrap `routes` in the middleware stack.
///
/// Outermost first, a request meets: CORS, request id assignment, tracing
/// (the span sees the id), id propagation onto the response, the timeout,
/// then panic recovery closest to the handlers.
fn with_middleware(routes: Router<AppState>, config: &ServerConfig) -> Router<AppState> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let timeout = Duration::from_secs(config.request_timeout_secs);

    routes
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(config))
}

/// Unknown paths answer with the same `{error, code}` body as handler errors.
async fn route_not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": format!("No route for {}", uri.path()),
            "code": "NOT_FOUND",
        })),
    )
}

/// CORS policy from `CORS_ORIGINS`.
///
/// `*` (the default) allows any origin without credentials. An explicit list
/// allows credentials for those origins only, and exposes the request id so
/// browser clients can report it. Panics at startup on an origin that is not
/// a valid header value.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_allows_any() {
        return CorsLayer::permissive().max_age(CORS_MAX_AGE);
    }

    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}
