//! AI client module for LLM integration through OpenAI-compatible APIs.
//!
//! This module provides:
//! - `AiClient` trait for abstracting AI providers
//! - `OpenAiCompatClient` with rate limiting and an optional disk cache
//! - `FakeAiClient` for tests
//! - Configuration via environment variables
//! - Prompt templates for itineraries and the credential probe
//!
//! # Configuration
//!
//! Set these environment variables:
//!
//! - `WANDER_AI_API_KEY` (required): API key for the provider
//! - `WANDER_AI_MODEL` (optional): Model name, e.g., "openai/gpt-4o-mini"
//! - `WANDER_AI_BASE_URL` (optional): API base URL
//! - `WANDER_AI_CACHE_DIR` (optional): Cache directory path, "none" disables it
//! - `WANDER_AI_OFFLINE` (optional): Set to "true" to use cache only
//! - `WANDER_AI_RATE_LIMIT_MS` (optional): Delay between requests in ms
//!
//! # Example
//!
//! ```ignore
//! use wander_core::ai::{AiClient, ChatMessage, ChatRequest, OpenAiCompatClient};
//!
//! let client = OpenAiCompatClient::from_env()?;
//!
//! let request = ChatRequest {
//!     messages: vec![ChatMessage::user("Hello!")],
//!     ..Default::default()
//! };
//!
//! let response = client.complete("test", request).await?;
//! println!("Response: {}", response.content);
//! ```

mod cache;
mod client;
mod config;
mod fake;
pub mod prompts;
mod types;

pub use crate::config::ConfigError;
pub use cache::{AiCache, CacheKey, CacheStats, CachedAiResponse};
pub use client::{AiClient, AiError, OpenAiCompatClient};
pub use config::AiConfig;
pub use fake::{FakeAiClient, FakeReply, RecordedCall};
pub use types::{ChatMessage, ChatRequest, ChatResponse, Role, Usage};
