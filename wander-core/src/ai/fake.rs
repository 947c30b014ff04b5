//! Fake AI client for testing.
//!
//! Replies are looked up in three places, in order:
//! 1. a per-prompt-name script, consumed one reply per call;
//! 2. canned responses matched by a substring of the prompt (case-insensitive);
//! 3. the default response.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::client::{AiClient, AiError};
use super::types::{ChatRequest, ChatResponse, Usage};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum FakeReply {
    Text(String),
    Error(String),
}

impl FakeReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }
}

/// A call the fake received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt_name: String,
    pub temperature: Option<f32>,
    pub prompt: String,
}

#[derive(Debug, Default)]
pub struct FakeAiClient {
    scripts: Mutex<HashMap<String, VecDeque<FakeReply>>>,
    responses: Vec<(String, String)>,
    default_response: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
    commits: Mutex<Vec<RecordedCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FakeAiClient {
    /// Create a fake with no replies configured; every call errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for calls made with `prompt_name`.
    pub fn with_script(self, prompt_name: &str, replies: Vec<FakeReply>) -> Self {
        lock(&self.scripts)
            .entry(prompt_name.to_string())
            .or_default()
            .extend(replies);
        self
    }

    /// Reply with `response` whenever the prompt contains `prompt_contains`.
    pub fn with_response(mut self, prompt_contains: &str, response: &str) -> Self {
        self.responses
            .push((prompt_contains.to_lowercase(), response.to_string()));
        self
    }

    /// Set the reply used when nothing else matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Calls received for one prompt name.
    pub fn calls_for(&self, prompt_name: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.prompt_name == prompt_name)
            .collect()
    }

    /// Responses the caller accepted via [`AiClient::commit`].
    pub fn commits(&self) -> Vec<RecordedCall> {
        lock(&self.commits).clone()
    }

    fn next_reply(&self, prompt_name: &str, prompt: &str) -> Option<FakeReply> {
        if let Some(reply) = lock(&self.scripts)
            .get_mut(prompt_name)
            .and_then(|queue| queue.pop_front())
        {
            return Some(reply);
        }

        let prompt_lower = prompt.to_lowercase();
        self.responses
            .iter()
            .find(|(pattern, _)| prompt_lower.contains(pattern))
            .map(|(_, response)| FakeReply::Text(response.clone()))
            .or_else(|| self.default_response.clone().map(FakeReply::Text))
    }
}

#[async_trait]
impl AiClient for FakeAiClient {
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        let prompt = request.prompt_text();
        lock(&self.calls).push(RecordedCall {
            prompt_name: prompt_name.to_string(),
            temperature: request.temperature,
            prompt: prompt.clone(),
        });

        match self.next_reply(prompt_name, &prompt) {
            Some(FakeReply::Text(content)) => Ok(ChatResponse {
                content,
                usage: Usage::default(),
                cached: false,
            }),
            Some(FakeReply::Error(message)) => Err(AiError::Api(message)),
            None => Err(AiError::Api(format!(
                "FakeAiClient: no response configured for {} (first 100 chars): {}",
                prompt_name,
                prompt.chars().take(100).collect::<String>()
            ))),
        }
    }

    fn commit(&self, prompt_name: &str, request: &ChatRequest, _response: &ChatResponse) {
        lock(&self.commits).push(RecordedCall {
            prompt_name: prompt_name.to_string(),
            temperature: request.temperature,
            prompt: request.prompt_text(),
        });
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
