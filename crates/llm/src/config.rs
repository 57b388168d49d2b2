/// Default API base URL.
const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Language-model API configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL without trailing slash, e.g. `https://api.openai.com/v1`.
    pub api_url: String,
    /// Bearer key. `None` disables the AI endpoints.
    pub api_key: Option<String>,
    pub chat_model: String,
    /// Must produce 1536-dimension vectors to match `resource_chunks`.
    pub embedding_model: String,
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                     |
    /// |-----------------------|-----------------------------|
    /// | `LLM_API_URL`         | `https://api.openai.com/v1` |
    /// | `LLM_API_KEY`         | unset (AI disabled)         |
    /// | `LLM_CHAT_MODEL`      | `gpt-4o-mini`               |
    /// | `LLM_EMBEDDING_MODEL` | `text-embedding-3-small`    |
    /// | `LLM_TIMEOUT_SECS`    | `60`                        |
    ///
    /// # Panics
    ///
    /// Panics if `LLM_TIMEOUT_SECS` is not a valid `u64`.
    pub fn from_env() -> Self {
        let api_url = std::env::var("LLM_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.into())
            .trim_end_matches('/')
            .to_string();

        let api_key = std::env::var("LLM_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let chat_model =
            std::env::var("LLM_CHAT_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.into());
        let embedding_model = std::env::var("LLM_EMBEDDING_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.into());

        let timeout_secs: u64 = std::env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("LLM_TIMEOUT_SECS must be a valid u64");

        Self {
            api_url,
            api_key,
            chat_model,
            embedding_model,
            timeout_secs,
        }
    }
}

impl Default for LlmConfig {
    /// Unconfigured client settings (no key).
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            api_key: None,
            chat_model: DEFAULT_CHAT_MODEL.into(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
