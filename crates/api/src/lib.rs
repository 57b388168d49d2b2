//! HTTP layer of the Educ-CI backend.
//!
//! The binary in `main.rs` wires configuration, database, event bus and
//! language-model client into an [`state::AppState`] and serves the router
//! built by [`router::build_app_router`]. Integration tests build the same
//! router.

pub mod access;
pub mod audit;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod storage;
