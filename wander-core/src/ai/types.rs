//! Provider-neutral chat types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// One generation call.
///
/// The serialized form (messages, sampling settings) is what the response
/// cache hashes; the two flags only steer the client and are not part of it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Ask the provider for a JSON object response.
    #[serde(skip)]
    pub json_response: bool,
    /// Always hit the provider; neither read nor write the cache.
    #[serde(skip)]
    pub bypass_cache: bool,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn json(mut self) -> Self {
        self.json_response = true;
        self
    }

    pub fn uncached(mut self) -> Self {
        self.bypass_cache = true;
        self
    }

    /// All message contents joined by newlines.
    pub fn prompt_text(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub usage: Usage,
    /// Served from the response cache rather than the provider.
    #[serde(default)]
    pub cached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_are_not_serialized() {
        let plain = ChatRequest::new(vec![ChatMessage::user("hi")]).with_temperature(0.5);
        let flagged = plain.clone().json().uncached();

        assert_eq!(
            serde_json::to_string(&plain).unwrap(),
            serde_json::to_string(&flagged).unwrap()
        );
        assert!(flagged.json_response && flagged.bypass_cache);
    }

    #[test]
    fn test_prompt_text_joins_messages() {
        let request = ChatRequest::new(vec![
            ChatMessage::system("You are a guide."),
            ChatMessage::user("Plan a walk."),
        ]);
        assert_eq!(request.prompt_text(), "You are a guide.\nPlan a walk.");
    }
}
