use serde::{Deserialize, Serialize};

use super::Message;

/// Parameters for a chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn builder() -> LlmRequestBuilder {
        LlmRequestBuilder::new()
    }
}

/// Builder for LlmRequest
#[derive(Debug, Default)]
pub struct LlmRequestBuilder {
    messages: Vec<Message>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LlmRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::system(content));
        self
    }

    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Apply every option that is set, leaving the rest untouched
    pub fn options(self, options: &GenerationOptions) -> Self {
        let mut builder = match &options.system_prompt {
            Some(system) => self.system(system.clone()),
            None => self,
        };

        if let Some(temp) = options.temperature {
            builder = builder.temperature(temp);
        }

        if let Some(tokens) = options.max_tokens {
            builder = builder.max_tokens(tokens);
        }

        builder
    }

    pub fn build(self) -> LlmRequest {
        LlmRequest {
            messages: self.messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Settings applied to every prompt a chain sends
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    /// Sent as a system message ahead of each prompt
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl GenerationOptions {
    /// Request carrying `prompt` as the only user message
    pub fn request_for(&self, prompt: &str) -> LlmRequest {
        LlmRequest::builder().options(self).user(prompt).build()
    }
}
