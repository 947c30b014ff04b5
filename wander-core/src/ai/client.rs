use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestUserMessage, CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    CreateChatCompletionResponse, ResponseFormat,
};
use async_openai::Client;
use async_trait::async_trait;
use thiserror::Error;

use super::cache::{AiCache, CacheKey};
use super::config::AiConfig;
use super::types::{ChatMessage, ChatRequest, ChatResponse, Role, Usage};
use crate::config::ConfigError;
use crate::rate_limit::RateLimiter;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Response not in cache and offline mode is enabled")]
    OfflineNotCached,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// A text-generation provider.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Run one chat completion. `prompt_name` groups cache entries and logs.
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError>;

    /// Keep a response the caller accepted, so an identical request is served
    /// from cache next time. Responses are never cached before this call.
    fn commit(&self, _prompt_name: &str, _request: &ChatRequest, _response: &ChatResponse) {}

    fn model_name(&self) -> &str;
}

/// Client for any OpenAI-compatible chat-completions endpoint.
pub struct OpenAiCompatClient {
    client: Client<OpenAIConfig>,
    config: AiConfig,
    cache: Option<AiCache>,
    rate_limiter: RateLimiter,
}

impl OpenAiCompatClient {
    pub fn from_env() -> Result<Self, AiError> {
        Ok(Self::new(AiConfig::from_env()?))
    }

    pub fn new(config: AiConfig) -> Self {
        let client = Client::with_config(
            OpenAIConfig::new()
                .with_api_key(&config.api_key)
                .with_api_base(&config.base_url),
        );

        Self {
            client,
            cache: config.cache_dir.clone().map(AiCache::new),
            rate_limiter: RateLimiter::from_millis(config.rate_limit_ms),
            config,
        }
    }

    fn build_request(
        &self,
        request: &ChatRequest,
    ) -> Result<CreateChatCompletionRequest, AiError> {
        let messages: Vec<ChatCompletionRequestMessage> =
            request.messages.iter().map(openai_message).collect();

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.config.model).messages(messages);

        if let Some(max_tokens) = request.max_tokens {
            args.max_completion_tokens(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            args.temperature(temperature);
        }
        if request.json_response {
            args.response_format(ResponseFormat::JsonObject);
        }

        args.build()
            .map_err(|e| AiError::Api(format!("Invalid chat request: {}", e)))
    }
}

fn openai_message(message: &ChatMessage) -> ChatCompletionRequestMessage {
    let content = message.content.clone();
    match message.role {
        Role::System => ChatCompletionRequestSystemMessage::from(content).into(),
        Role::User => ChatCompletionRequestUserMessage::from(content).into(),
    }
}

fn into_chat_response(response: CreateChatCompletionResponse) -> ChatResponse {
    let usage = response
        .usage
        .map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();

    ChatResponse {
        content,
        usage,
        cached: false,
    }
}

#[async_trait]
impl AiClient for OpenAiCompatClient {
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        let cache = self.cache.as_ref().filter(|_| !request.bypass_cache);
        let key = CacheKey::new(prompt_name, &self.config.model, &request);

        if let Some(entry) = cache.and_then(|c| c.get(&key)) {
            tracing::debug!(prompt_name, "AI response served from cache");
            return Ok(entry.into());
        }

        if self.config.offline {
            return Err(AiError::OfflineNotCached);
        }

        let openai_request = self.build_request(&request)?;

        self.rate_limiter.wait(&self.config.base_url).await;
        tracing::debug!(
            prompt_name,
            model = %self.config.model,
            temperature = ?request.temperature,
            "calling chat completions API"
        );

        self.client
            .chat()
            .create(openai_request)
            .await
            .map(into_chat_response)
            .map_err(|e| AiError::Api(e.to_string()))
    }

    fn commit(&self, prompt_name: &str, request: &ChatRequest, response: &ChatResponse) {
        if response.cached || request.bypass_cache {
            return;
        }
        let Some(cache) = &self.cache else {
            return;
        };

        let key = CacheKey::new(prompt_name, &self.config.model, request);
        match cache.put(&key, request, response) {
            Ok(()) => tracing::debug!(prompt_name, "AI response cached"),
            Err(e) => tracing::warn!(prompt_name, error = %e, "failed to write AI cache entry"),
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
