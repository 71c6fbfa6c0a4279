/// LLM Client: the single point of entry for all chat-completion calls in Hunter.
///
/// ARCHITECTURAL RULE: No other module may call the chat API directly.
/// All LLM interactions MUST go through this module, which in turn goes
/// through `http_client::RetryClient` for backoff.
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::http_client::{OutboundRequest, RetryClient, Upstream, UpstreamError};

pub mod prompts;

pub const DEFAULT_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage<'a>],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> ChatMessage<'a> {
    pub fn system(content: &'a str) -> Self {
        Self {
            role: "system",
            content,
        }
    }

    pub fn user(content: &'a str) -> Self {
        Self {
            role: "user",
            content,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

/// The single LLM client used by all services in Hunter.
/// Keys are supplied per call by the requesting user, never held by the client.
#[derive(Clone)]
pub struct LlmClient {
    http: RetryClient,
    endpoint: String,
    model: String,
}

impl LlmClient {
    pub fn new(http: RetryClient, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw chat-completion call. `temperature: None` leaves sampling at the
    /// upstream default. Retries follow the `RetryClient` rules.
    pub async fn call(
        &self,
        messages: &[ChatMessage<'_>],
        temperature: Option<f32>,
        api_key: &str,
    ) -> Result<ChatResponse, LlmError> {
        let body = serde_json::to_value(ChatRequest {
            model: &self.model,
            messages,
            temperature,
        })?;
        let request = OutboundRequest::post_json(&self.endpoint, body)
            .header("Authorization", format!("Bearer {api_key}"));

        let response: ChatResponse = self.http.call(Upstream::Chat, &request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(response)
    }

    /// Calls the LLM and returns the first choice's text.
    pub async fn call_text(
        &self,
        messages: &[ChatMessage<'_>],
        temperature: Option<f32>,
        api_key: &str,
    ) -> Result<String, LlmError> {
        let response = self.call(messages, temperature, api_key).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    /// Convenience method that calls the LLM and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        messages: &[ChatMessage<'_>],
        temperature: Option<f32>,
        api_key: &str,
    ) -> Result<T, LlmError> {
        let text = self.call_text(messages, temperature, api_key).await?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(&text);

        serde_json::from_str(&text).map_err(LlmError::Parse)
    }
}

/// Removes every ```json / ``` fence marker, wherever the model put them.
fn strip_json_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::http_client::testing::{RawResponseExt, ScriptedTransport};
    use crate::http_client::{RawResponse, RetryPolicy};
    use serde_json::json;

    fn chat_body(content: &str) -> String {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        })
        .to_string()
    }

    fn llm(transport: Arc<ScriptedTransport>) -> LlmClient {
        LlmClient::new(
            RetryClient::new(transport, RetryPolicy::default()),
            DEFAULT_CHAT_URL,
            DEFAULT_MODEL,
        )
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[tokio::test]
    async fn test_call_sends_bearer_model_and_temperature() {
        let transport = Arc::new(ScriptedTransport::new(vec![RawResponse::ok(&chat_body(
            "hi",
        ))]));

        let text = llm(transport.clone())
            .call_text(&[ChatMessage::user("hello")], Some(0.0), "sk-test")
            .await
            .unwrap();

        assert_eq!(text, "hi");
        let sent = &transport.requests()[0];
        assert_eq!(sent.body["model"], DEFAULT_MODEL);
        assert_eq!(sent.body["temperature"], 0.0);
        assert_eq!(sent.body["messages"][0], json!({"role": "user", "content": "hello"}));
        assert!(sent
            .headers
            .contains(&("Authorization".to_string(), "Bearer sk-test".to_string())));
    }

    #[tokio::test]
    async fn test_default_sampling_omits_temperature() {
        let transport = Arc::new(ScriptedTransport::new(vec![RawResponse::ok(&chat_body(
            "hi",
        ))]));

        llm(transport.clone())
            .call_text(&[ChatMessage::user("hello")], None, "k")
            .await
            .unwrap();

        assert!(transport.requests()[0].body.get("temperature").is_none());
    }

    #[tokio::test]
    async fn test_empty_choices_is_empty_content() {
        let transport = Arc::new(ScriptedTransport::new(vec![RawResponse::ok(
            r#"{"choices": []}"#,
        )]));

        let err = llm(transport)
            .call_text(&[ChatMessage::user("hello")], None, "k")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[tokio::test]
    async fn test_call_json_strips_fences() {
        let transport = Arc::new(ScriptedTransport::new(vec![RawResponse::ok(&chat_body(
            "```json\n[1, 2, 3]\n```",
        ))]));

        let parsed: Vec<u8> = llm(transport)
            .call_json(&[ChatMessage::user("numbers")], Some(0.0), "k")
            .await
            .unwrap();

        assert_eq!(parsed, vec![1, 2, 3]);
    }
}
