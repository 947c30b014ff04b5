use std::path::PathBuf;

use crate::config::{env_flag, env_var, parse_env_var, require_env_var, ConfigError};

/// OpenRouter speaks the OpenAI chat-completions protocol.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Minimum milliseconds between two provider calls.
pub const DEFAULT_RATE_LIMIT_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    /// e.g. "openai/gpt-4o-mini" or "google/gemini-2.0-flash-001"
    pub model: String,
    pub base_url: String,
    /// None disables the response cache.
    pub cache_dir: Option<PathBuf>,
    /// Serve from the cache only; uncached requests fail.
    pub offline: bool,
    pub rate_limit_ms: u64,
}

impl AiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: Some(Self::default_cache_dir()),
            offline: false,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `WANDER_AI_API_KEY`
    ///
    /// Optional:
    /// - `WANDER_AI_MODEL` (default: "openai/gpt-4o-mini")
    /// - `WANDER_AI_BASE_URL` (default: "https://openrouter.ai/api/v1")
    /// - `WANDER_AI_CACHE_DIR`: "none" disables the cache (default: "~/.wander/ai-cache")
    /// - `WANDER_AI_OFFLINE`: "true" or "1" to use the cache only
    /// - `WANDER_AI_RATE_LIMIT_MS` (default: 500)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(require_env_var("WANDER_AI_API_KEY")?);

        if let Some(model) = env_var("WANDER_AI_MODEL") {
            config.model = model;
        }
        if let Some(base_url) = env_var("WANDER_AI_BASE_URL") {
            config.base_url = base_url;
        }
        config.cache_dir = Self::cache_dir_from_env();
        config.offline = env_flag("WANDER_AI_OFFLINE");
        if let Some(ms) = parse_env_var("WANDER_AI_RATE_LIMIT_MS")? {
            config.rate_limit_ms = ms;
        }

        Ok(config)
    }

    /// Cache directory from `WANDER_AI_CACHE_DIR`; None when set to "none".
    pub fn cache_dir_from_env() -> Option<PathBuf> {
        match env_var("WANDER_AI_CACHE_DIR") {
            Some(dir) if dir.eq_ignore_ascii_case("none") => None,
            Some(dir) => Some(PathBuf::from(dir)),
            None => Some(Self::default_cache_dir()),
        }
    }

    /// `~/.wander/ai-cache`, or `data/ai-cache` without a home directory.
    pub fn default_cache_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".wander").join("ai-cache"))
            .unwrap_or_else(|| PathBuf::from("data/ai-cache"))
    }
}
