//! Client for an OpenAI-compatible language-model API.
//!
//! Used for questionnaire generation (`chat_json`) and for embedding
//! library questions before the vector search (`embed`).

pub mod client;
pub mod config;

pub use client::{LlmClient, LlmError};
pub use config::LlmConfig;
