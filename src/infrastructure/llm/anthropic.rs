use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::HttpClientTrait;
use crate::domain::{
    DomainError, FinishReason, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole, Usage,
};

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic messages API provider
#[derive(Debug)]
pub struct AnthropicProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
}

impl<C: HttpClientTrait> AnthropicProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_ANTHROPIC_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            api_key: api_key.into(),
            base_url,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn build_request(&self, model: &str, request: &LlmRequest) -> serde_json::Value {
        let (system, messages) = split_system_messages(&request.messages);

        let anthropic_messages: Vec<AnthropicMessage> = messages
            .into_iter()
            .map(AnthropicMessage::from_domain)
            .collect();

        let mut body = serde_json::json!({
            "model": model,
            "messages": anthropic_messages,
            "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });

        if let Some(system_content) = system {
            body["system"] = serde_json::json!(system_content);
        }

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-api-key", self.api_key.as_str()),
            ("anthropic-version", ANTHROPIC_VERSION),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        let response: AnthropicResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("anthropic", format!("Failed to parse response: {}", e))
        })?;

        let content = response
            .content
            .into_iter()
            .filter(|block| block.content_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        let llm_response = LlmResponse::new(response.id, response.model, content)
            .with_finish_reason(parse_stop_reason(response.stop_reason.as_deref()))
            .with_usage(Usage::new(
                response.usage.input_tokens,
                response.usage.output_tokens,
            ));

        Ok(llm_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for AnthropicProvider<C> {
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let url = self.messages_url();
        let body = self.build_request(model, &request);
        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| match e {
                DomainError::Provider { message, .. } => DomainError::provider("anthropic", message),
                other => other,
            })?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "anthropic"
    }
}

/// System messages travel in a top-level field, joined by newlines
fn split_system_messages(messages: &[Message]) -> (Option<String>, Vec<&Message>) {
    let (system, others): (Vec<&Message>, Vec<&Message>) = messages
        .iter()
        .partition(|msg| msg.role == MessageRole::System);

    let system = if system.is_empty() {
        None
    } else {
        Some(
            system
                .iter()
                .map(|msg| msg.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    };

    (system, others)
}

fn parse_stop_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("end_turn") | Some("stop_sequence") => FinishReason::Stop,
        Some("max_tokens") => FinishReason::Length,
        Some("tool_use") => FinishReason::ToolCalls,
        _ => FinishReason::Stop,
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> AnthropicMessage<'a> {
    fn from_domain(message: &'a Message) -> Self {
        let role = match message.role {
            MessageRole::Assistant => "assistant",
            MessageRole::User | MessageRole::System => "user",
        };

        Self {
            role,
            content: &message.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    id: String,
    model: String,
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;

    const TEST_URL: &str = "https://api.anthropic.com/v1/messages";

    fn message_response(id: &str, text: &str, stop_reason: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-sonnet-latest",
            "content": [{ "type": "text", "text": text }],
            "stop_reason": stop_reason,
            "usage": { "input_tokens": 12, "output_tokens": 10 }
        })
    }

    #[tokio::test]
    async fn test_anthropic_chat() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, message_response("msg_123", "Hello there", "end_turn"));
        let provider = AnthropicProvider::new(client, "test-api-key");

        let response = provider
            .chat("claude-3-5-sonnet-latest", LlmRequest::builder().user("Hello!").build())
            .await
            .unwrap();

        assert_eq!(response.id, "msg_123");
        assert_eq!(response.content(), "Hello there");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage, Some(Usage::new(12, 10)));
    }

    #[tokio::test]
    async fn test_anthropic_system_message_handling() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, message_response("msg_1", "ok", "end_turn"));
        let provider = AnthropicProvider::new(client, "test-key");

        let request = LlmRequest::builder()
            .system("System prompt 1")
            .system("System prompt 2")
            .user("Hello")
            .build();
        provider
            .chat("claude-3-5-sonnet-latest", request)
            .await
            .unwrap();

        let body = provider.client.last_body().unwrap();
        assert_eq!(body["system"], "System prompt 1\nSystem prompt 2");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], 4096);
    }

    #[tokio::test]
    async fn test_anthropic_max_tokens_stop_reason() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, message_response("msg_2", "cut", "max_tokens"));
        let provider = AnthropicProvider::new(client, "test-key");

        let response = provider
            .chat("claude-3-5-sonnet-latest", LlmRequest::builder().user("long").build())
            .await
            .unwrap();

        assert_eq!(response.finish_reason, Some(FinishReason::Length));
    }

    #[tokio::test]
    async fn test_anthropic_error_is_attributed() {
        let client = MockHttpClient::new().with_error(TEST_URL, "overloaded");
        let provider = AnthropicProvider::new(client, "test-key");

        let result = provider
            .chat("claude-3-5-sonnet-latest", LlmRequest::builder().user("hi").build())
            .await;

        assert!(matches!(
            result,
            Err(DomainError::Provider { ref provider, .. }) if provider == "anthropic"
        ));
    }
}
